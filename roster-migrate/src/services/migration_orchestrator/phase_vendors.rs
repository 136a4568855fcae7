//! Phase 2: VENDORS
//!
//! Vendors are organizations keyed on their legal name, so a vendor that
//! shares a name with an earlier customer company becomes the same entity.
//! The organization subtype follows the classified category.

use super::{MigrationOrchestrator, SectionStats};
use crate::db::lookups::resolve_or_create_described;
use crate::db::roles::VendorProfile;
use crate::legacy::VendorRecord;
use crate::services::entity_resolver::{EntityResolver, OrganizationInput};
use crate::services::role_attacher::Contact;
use roster_common::db::{EntityKind, LookupTable, RoleCode};
use roster_common::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

impl MigrationOrchestrator {
    /// Phase 2: VENDORS - classify, resolve, grant VENDOR, write profile and contacts
    ///
    /// # Returns
    /// Section statistics and the vendor count per canonical category
    pub(super) async fn phase_vendors(&mut self) -> Result<(SectionStats, BTreeMap<String, usize>)> {
        info!("Phase 2: VENDORS");

        let rows = self.source.vendors().await?;
        let mut stats = SectionStats::default();
        let mut categories = BTreeMap::new();

        for row in &rows {
            stats.rows_read += 1;
            let record = VendorRecord::from_row(row);

            let Some(name) = record.name.as_deref() else {
                warn!(legacy_id = ?record.legacy_id, "Vendor skipped: blank name");
                stats.skipped_blank_name += 1;
                continue;
            };

            let category = self.classifier.classify(record.category.as_deref());
            *categories.entry(category.code.to_string()).or_insert(0) += 1;

            let legacy_id = record.legacy_id.as_deref();
            let key = EntityResolver::organization_key(name);
            let resolution = match self.rediscover(RoleCode::Vendor, legacy_id).await? {
                Some(found) => found,
                None => {
                    self.resolver
                        .resolve_or_create_org(&OrganizationInput {
                            legal_name: name,
                            org_type: category.org_type(),
                            display_name: name,
                            tax_id: record.tax_id.as_deref(),
                        })
                        .await?
                }
            };

            self.remember(RoleCode::Vendor, legacy_id, &key, resolution);
            stats.record(EntityKind::Organization, resolution.outcome);
            let entity = resolution.id;
            debug!(
                legacy_id,
                entity = %entity,
                category = category.code,
                outcome = ?resolution.outcome,
                "Vendor resolved"
            );

            self.attacher.grant_role(entity, RoleCode::Vendor).await?;

            let vendor_category_id = resolve_or_create_described(
                &self.db,
                LookupTable::VendorCategories,
                category.code,
                Some(category.description.as_str()),
                self.mode,
            )
            .await?;

            let profile = VendorProfile {
                legacy_vendor_id: record.legacy_id.clone(),
                vendor_category_id: Some(vendor_category_id),
                legacy_category: record.category.clone(),
                account_number: record.account_number.clone(),
                tax_id: record.tax_id.clone(),
                is_active: record.is_active,
            };
            self.attacher.upsert_vendor_profile(entity, &profile).await?;

            self.offer_phones(
                entity,
                &[("work", record.phone.as_deref()), ("fax", record.fax.as_deref())],
                &mut stats,
            )
            .await?;
            self.offer(
                entity,
                &Contact::Email {
                    email_type: "work",
                    email: record.email.as_deref(),
                },
                true,
                &mut stats,
            )
            .await?;
            self.offer(
                entity,
                &Contact::Address {
                    address_type: "mailing",
                    fields: &record.address,
                },
                true,
                &mut stats,
            )
            .await?;
        }

        Ok((stats, categories))
    }
}
