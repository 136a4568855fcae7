//! Phase 4: TIMECLOCK
//!
//! Each punch row is matched to its employee, its transaction type code
//! translated to a label, and the row handed to the reconstruction engine.
//! Events are written insert-if-absent on (employee, action, timestamp).

use super::{MigrationOrchestrator, TimeclockStats};
use crate::db::lookups::require;
use crate::db::roles::find_entity_by_legacy_id;
use crate::db::time_events::{insert_time_event, NewTimeEvent};
use crate::legacy::PunchRecord;
use crate::models::EntityId;
use crate::services::timeclock::{reconstruct, PunchInput, Reconstruction};
use roster_common::db::{LookupTable, RoleCode};
use roster_common::Result;
use tracing::{debug, info, warn};

impl MigrationOrchestrator {
    /// Phase 4: TIMECLOCK - reconstruct and write time events
    pub(super) async fn phase_timeclock(&mut self) -> Result<TimeclockStats> {
        info!("Phase 4: TIMECLOCK");

        let labels = self.source.transaction_types().await?;
        let rows = self.source.time_punches().await?;
        let mut stats = TimeclockStats::default();

        for (index, row) in rows.iter().enumerate() {
            stats.rows_read += 1;
            let record = PunchRecord::from_row(row);

            let Some(employee) = self.resolve_employee(record.employee_id.as_deref()).await? else {
                warn!(
                    row = index + 1,
                    employee_id = ?record.employee_id,
                    "Punch skipped: missing employee"
                );
                stats.missing_employee += 1;
                continue;
            };

            let type_text = record
                .transaction_type
                .as_deref()
                .map(|code| labels.get(code).map(String::as_str).unwrap_or(code));

            let input = PunchInput {
                clock_in: record.clock_in,
                clock_out: record.clock_out,
                transaction_date: record.transaction_date,
                type_text,
            };

            let (events, flags) = match reconstruct(&input) {
                Reconstruction::Events { events, flags } => (events, flags),
                Reconstruction::MissingTimestamp => {
                    warn!(row = index + 1, employee = %employee, "Punch skipped: missing timestamp");
                    stats.missing_timestamp += 1;
                    continue;
                }
            };
            stats.record_flags(&flags);

            for event in events {
                let action_type_id =
                    require(&self.db, LookupTable::TimeclockActionTypes, event.action.code()).await?;
                let entry_type_id =
                    require(&self.db, LookupTable::TimeclockEntryTypes, event.entry_type.code()).await?;
                stats.events_emitted += 1;

                if !self.mode.writes() || !employee.is_materialized() {
                    continue;
                }

                let inserted = insert_time_event(
                    &self.db,
                    &NewTimeEvent {
                        entity: employee,
                        action_type_id,
                        occurred_at: event.occurred_at,
                        entry_type_id,
                        minutes: event.minutes,
                        note: event.note,
                    },
                )
                .await?;
                if !inserted {
                    debug!(employee = %employee, action = event.action.code(), "Time event already present");
                }
            }
        }

        Ok(stats)
    }

    /// Employee entity for a legacy employee id, from this run or the target
    async fn resolve_employee(&self, legacy_id: Option<&str>) -> Result<Option<EntityId>> {
        let Some(legacy_id) = legacy_id else {
            return Ok(None);
        };

        if let Some(id) = self.legacy_ids.get(&(RoleCode::Employee, legacy_id.to_string())) {
            return Ok(Some(*id));
        }
        find_entity_by_legacy_id(&self.db, RoleCode::Employee, legacy_id).await
    }
}
