//! Phase 3: EMPLOYEES

use super::{MigrationOrchestrator, SectionStats};
use crate::db::roles::EmployeeProfile;
use crate::legacy::EmployeeRecord;
use crate::services::entity_resolver::{EntityResolver, PersonInput};
use crate::services::role_attacher::Contact;
use roster_common::db::{EntityKind, LookupTable, RoleCode};
use roster_common::Result;
use tracing::{debug, info};

const UNKNOWN_EMPLOYEE: &str = "Unknown Employee";

impl MigrationOrchestrator {
    /// Phase 3: EMPLOYEES - resolve persons, grant EMPLOYEE, write profile and contacts
    ///
    /// Every employee's legacy id is remembered for the timeclock phase.
    pub(super) async fn phase_employees(&mut self) -> Result<SectionStats> {
        info!("Phase 3: EMPLOYEES");

        let rows = self.source.employees().await?;
        let mut stats = SectionStats::default();

        for row in &rows {
            stats.rows_read += 1;
            let record = EmployeeRecord::from_row(row);

            let legacy_id = record.legacy_id.as_deref();
            let display_name = record.name.display_name(UNKNOWN_EMPLOYEE);
            let key_extra = record.address.discriminator();
            let key = EntityResolver::person_key(
                record.name.first.as_deref(),
                record.name.last.as_deref(),
                &key_extra,
            );

            let resolution = match self.rediscover(RoleCode::Employee, legacy_id).await? {
                Some(found) => found,
                None => {
                    self.resolver
                        .resolve_or_create_person(&PersonInput {
                            first_name: record.name.first.as_deref(),
                            middle_name: record.name.middle.as_deref(),
                            last_name: record.name.last.as_deref(),
                            display_name: &display_name,
                            key_extra: &key_extra,
                            date_of_birth: record.date_of_birth,
                        })
                        .await?
                }
            };

            self.remember(RoleCode::Employee, legacy_id, &key, resolution);
            stats.record(EntityKind::Person, resolution.outcome);
            let entity = resolution.id;
            debug!(legacy_id, entity = %entity, outcome = ?resolution.outcome, "Employee resolved");

            self.attacher.grant_role(entity, RoleCode::Employee).await?;

            let status = record.status();
            let profile = EmployeeProfile {
                legacy_employee_id: record.legacy_id.clone(),
                employee_status_id: self
                    .lookup_optional(LookupTable::EmployeeStatuses, Some(status.as_str()))
                    .await?,
                job_title: record.job_title.clone(),
                hire_date: record.hire_date,
                termination_date: record.termination_date,
                pay_rate: record.pay_rate,
                pay_type: record.pay_type.clone(),
                is_timeclock_enabled: record.timeclock_enabled,
            };
            self.attacher.upsert_employee_profile(entity, &profile).await?;

            self.offer_phones(
                entity,
                &[
                    ("home", record.home_phone.as_deref()),
                    ("mobile", record.mobile_phone.as_deref()),
                ],
                &mut stats,
            )
            .await?;
            self.offer(
                entity,
                &Contact::Email {
                    email_type: "personal",
                    email: record.email.as_deref(),
                },
                true,
                &mut stats,
            )
            .await?;
            self.offer(
                entity,
                &Contact::Address {
                    address_type: "home",
                    fields: &record.address,
                },
                true,
                &mut stats,
            )
            .await?;
        }

        Ok(stats)
    }
}
