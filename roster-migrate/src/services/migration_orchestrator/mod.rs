//! Migration orchestrator
//!
//! Drives the engines over each legacy record family:
//! CUSTOMERS → VENDORS → EMPLOYEES → TIMECLOCK → SUBLET PROVIDERS
//!
//! Each state is handled by a dedicated `phase_*` method returning its own
//! statistics. The run is strictly sequential and aborts on the first
//! fatal error; every write is insert-if-absent, so a failed run can be
//! repeated.
//!
//! # Rediscovery
//! Before resolving a record by dedup key, its legacy id is looked up,
//! first among the records of this run, then in the target's role profile
//! table. A hit in the target adopts that entity and records the record's
//! dedup key against it, which is what keeps a second run from creating
//! anything new.

use crate::db::lookups::resolve_or_create;
use crate::db::roles::find_entity_by_legacy_id;
use crate::legacy::LegacySource;
use crate::models::{EntityId, RunMode};
use crate::services::entity_resolver::{EntityResolver, Resolution, ResolutionOutcome};
use crate::services::role_attacher::{Contact, ContactOutcome, RoleAttacher};
use crate::services::vendor_classifier::VendorClassifier;
use roster_common::db::{verify_target_schema, LookupTable, RoleCode};
use roster_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

mod phase_customers;
mod phase_employees;
mod phase_sublet;
mod phase_timeclock;
mod phase_vendors;
pub mod statistics;

pub use statistics::{MigrationReport, MigrationStatistics, SectionStats, TimeclockStats};

/// Migration orchestrator service
pub struct MigrationOrchestrator {
    db: SqlitePool,
    source: Box<dyn LegacySource>,
    mode: RunMode,
    resolver: EntityResolver,
    attacher: RoleAttacher,
    classifier: VendorClassifier,
    /// (role, legacy id) → entity, for records seen in this run
    legacy_ids: HashMap<(RoleCode, String), EntityId>,
}

impl MigrationOrchestrator {
    /// Create an orchestrator for one run over `source`
    pub fn new(db: SqlitePool, source: Box<dyn LegacySource>, mode: RunMode) -> Self {
        Self {
            resolver: EntityResolver::new(db.clone(), mode),
            attacher: RoleAttacher::new(db.clone(), mode),
            classifier: VendorClassifier::new(),
            legacy_ids: HashMap::new(),
            db,
            source,
            mode,
        }
    }

    pub fn with_classifier(mut self, classifier: VendorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Execute the complete migration
    ///
    /// Fails before reading any record when the target schema is incomplete.
    pub async fn run(mut self) -> Result<MigrationReport> {
        verify_target_schema(&self.db).await?;

        let run_id = Uuid::new_v4();
        let dry_run = self.mode.is_dry_run();
        info!(
            run_id = %run_id,
            dry_run,
            source = self.source.name(),
            "Starting migration"
        );

        let mut statistics = MigrationStatistics::default();

        statistics.customers = self.phase_customers().await?;
        info!("Customers: {}", statistics.customers.display_string());

        let (vendors, vendor_categories) = self.phase_vendors().await?;
        statistics.vendors = vendors;
        statistics.vendor_categories = vendor_categories;
        info!("Vendors: {}", statistics.vendors.display_string());

        statistics.employees = self.phase_employees().await?;
        info!("Employees: {}", statistics.employees.display_string());

        statistics.timeclock = self.phase_timeclock().await?;
        info!("Timeclock: {}", statistics.timeclock.display_string());

        statistics.sublet_providers = self.phase_sublet().await?;
        info!("Sublet providers: {}", statistics.sublet_providers.display_string());

        let report = MigrationReport {
            run_id,
            dry_run,
            statistics,
        };
        info!("Migration complete: {}", report.display_string());
        Ok(report)
    }

    /// Entity already holding `legacy_id` for `role`, if any
    async fn rediscover(&self, role: RoleCode, legacy_id: Option<&str>) -> Result<Option<Resolution>> {
        let Some(legacy_id) = legacy_id else {
            return Ok(None);
        };

        if let Some(id) = self.legacy_ids.get(&(role, legacy_id.to_string())) {
            return Ok(Some(Resolution {
                id: *id,
                outcome: ResolutionOutcome::Reused,
            }));
        }

        let found = find_entity_by_legacy_id(&self.db, role, legacy_id).await?;
        Ok(found.map(|id| {
            debug!(role = %role, legacy_id, id = %id, "Adopted by legacy id");
            Resolution {
                id,
                outcome: ResolutionOutcome::Adopted,
            }
        }))
    }

    /// Record the legacy id and adopt the dedup key for a rediscovered entity
    fn remember(&mut self, role: RoleCode, legacy_id: Option<&str>, key: &str, resolution: Resolution) {
        if let Some(legacy_id) = legacy_id {
            self.legacy_ids
                .entry((role, legacy_id.to_string()))
                .or_insert(resolution.id);
        }
        if resolution.outcome != ResolutionOutcome::Created {
            self.resolver.adopt(key, resolution.id);
        }
    }

    /// Lookup id for an optional legacy value; blank values stay unset
    async fn lookup_optional(&self, table: LookupTable, value: Option<&str>) -> Result<Option<i64>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => Ok(Some(resolve_or_create(&self.db, table, value, self.mode).await?)),
            None => Ok(None),
        }
    }

    /// Offer phones in order; the first non-blank one is primary
    async fn offer_phones(
        &self,
        entity: EntityId,
        phones: &[(&str, Option<&str>)],
        stats: &mut SectionStats,
    ) -> Result<()> {
        let mut primary = true;
        for (phone_type, number) in phones {
            let contact = Contact::Phone {
                phone_type: *phone_type,
                number: *number,
            };
            if self.offer(entity, &contact, primary, stats).await? == ContactOutcome::Offered {
                primary = false;
            }
        }
        Ok(())
    }

    async fn offer(
        &self,
        entity: EntityId,
        contact: &Contact<'_>,
        is_primary: bool,
        stats: &mut SectionStats,
    ) -> Result<ContactOutcome> {
        let outcome = self.attacher.add_contact(entity, contact, is_primary).await?;
        if outcome == ContactOutcome::Offered {
            stats.contacts_offered += 1;
        }
        Ok(outcome)
    }
}
