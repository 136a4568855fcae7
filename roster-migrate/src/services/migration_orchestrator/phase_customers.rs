//! Phase 1: CUSTOMERS
//!
//! Customers with a company name become BUSINESS organizations, everyone
//! else a person keyed on name plus address. A customer with no usable name
//! still resolves, under a placeholder display name and a blank key.

use super::{MigrationOrchestrator, SectionStats};
use crate::db::roles::CustomerProfile;
use crate::legacy::CustomerRecord;
use crate::services::entity_resolver::{EntityResolver, OrganizationInput, PersonInput};
use crate::services::role_attacher::Contact;
use roster_common::db::{EntityKind, LookupTable, OrgType, RoleCode};
use roster_common::Result;
use tracing::{debug, info};

const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

impl MigrationOrchestrator {
    /// Phase 1: CUSTOMERS - resolve, grant CUSTOMER, write profile and contacts
    pub(super) async fn phase_customers(&mut self) -> Result<SectionStats> {
        info!("Phase 1: CUSTOMERS");

        let rows = self.source.customers().await?;
        let mut stats = SectionStats::default();

        for row in &rows {
            stats.rows_read += 1;
            let record = CustomerRecord::from_row(row);
            self.migrate_customer(&record, &mut stats).await?;
        }

        Ok(stats)
    }

    async fn migrate_customer(&mut self, record: &CustomerRecord, stats: &mut SectionStats) -> Result<()> {
        let legacy_id = record.legacy_id.as_deref();
        let rediscovered = self.rediscover(RoleCode::Customer, legacy_id).await?;

        let (kind, key, resolution) = match record.company_name.as_deref() {
            Some(company) => {
                let key = EntityResolver::organization_key(company);
                let resolution = match rediscovered {
                    Some(found) => found,
                    None => {
                        self.resolver
                            .resolve_or_create_org(&OrganizationInput {
                                legal_name: company,
                                org_type: OrgType::Business,
                                display_name: company,
                                tax_id: record.tax_id.as_deref(),
                            })
                            .await?
                    }
                };
                (EntityKind::Organization, key, resolution)
            }
            None => {
                let display_name = record.name.display_name(UNKNOWN_CUSTOMER);
                let key_extra = record.address.discriminator();
                let key = EntityResolver::person_key(
                    record.name.first.as_deref(),
                    record.name.last.as_deref(),
                    &key_extra,
                );
                let resolution = match rediscovered {
                    Some(found) => found,
                    None => {
                        self.resolver
                            .resolve_or_create_person(&PersonInput {
                                first_name: record.name.first.as_deref(),
                                middle_name: record.name.middle.as_deref(),
                                last_name: record.name.last.as_deref(),
                                display_name: &display_name,
                                key_extra: &key_extra,
                                date_of_birth: None,
                            })
                            .await?
                    }
                };
                (EntityKind::Person, key, resolution)
            }
        };

        self.remember(RoleCode::Customer, legacy_id, &key, resolution);
        stats.record(kind, resolution.outcome);
        let entity = resolution.id;
        debug!(legacy_id, entity = %entity, outcome = ?resolution.outcome, "Customer resolved");

        self.attacher.grant_role(entity, RoleCode::Customer).await?;

        let profile = CustomerProfile {
            legacy_customer_id: record.legacy_id.clone(),
            customer_type_id: self
                .lookup_optional(LookupTable::CustomerTypes, record.customer_type.as_deref())
                .await?,
            pricing_plan_id: self
                .lookup_optional(LookupTable::PricingPlans, record.pricing_plan.as_deref())
                .await?,
            credit_limit: record.credit_limit,
            tax_exempt: record.tax_exempt,
            tax_id: record.tax_id.clone(),
            allow_charge: record.allow_charge,
            send_statements: record.send_statements,
            notes: record.notes.clone(),
        };
        self.attacher.upsert_customer_profile(entity, &profile).await?;

        self.offer_phones(
            entity,
            &[
                ("home", record.home_phone.as_deref()),
                ("work", record.work_phone.as_deref()),
                ("mobile", record.mobile_phone.as_deref()),
                ("fax", record.fax.as_deref()),
            ],
            stats,
        )
        .await?;

        let email_type = match kind {
            EntityKind::Organization => "work",
            EntityKind::Person => "personal",
        };
        self.offer(
            entity,
            &Contact::Email {
                email_type,
                email: record.email.as_deref(),
            },
            true,
            stats,
        )
        .await?;
        self.offer(
            entity,
            &Contact::Address {
                address_type: "mailing",
                fields: &record.address,
            },
            true,
            stats,
        )
        .await?;

        Ok(())
    }
}
