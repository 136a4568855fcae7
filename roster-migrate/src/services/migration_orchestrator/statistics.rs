//! Migration run statistics
//!
//! Each phase returns its own summary; the orchestrator folds them into a
//! [`MigrationReport`]. Counters record decisions rather than writes, so a
//! dry run and a live run over the same target report identical numbers.

use crate::services::entity_resolver::ResolutionOutcome;
use crate::services::timeclock::ReconstructionFlags;
use roster_common::db::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// **Party section statistics** (customers, vendors, employees, sublet providers)
///
/// Display: "N rows: P persons, O organizations (C created, R reused, A adopted), B blank names skipped, K contacts"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    pub rows_read: usize,
    pub persons: usize,
    pub organizations: usize,
    pub entities_created: usize,
    /// Resolved from the in-run dedup or legacy id map
    pub entities_reused: usize,
    /// Rediscovered in the target by legacy id
    pub entities_adopted: usize,
    pub skipped_blank_name: usize,
    pub contacts_offered: usize,
}

impl SectionStats {
    pub fn record(&mut self, kind: EntityKind, outcome: ResolutionOutcome) {
        match kind {
            EntityKind::Person => self.persons += 1,
            EntityKind::Organization => self.organizations += 1,
        }
        match outcome {
            ResolutionOutcome::Created => self.entities_created += 1,
            ResolutionOutcome::Reused => self.entities_reused += 1,
            ResolutionOutcome::Adopted => self.entities_adopted += 1,
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} rows: {} persons, {} organizations ({} created, {} reused, {} adopted), \
             {} blank names skipped, {} contacts",
            self.rows_read,
            self.persons,
            self.organizations,
            self.entities_created,
            self.entities_reused,
            self.entities_adopted,
            self.skipped_blank_name,
            self.contacts_offered
        )
    }
}

/// **TIMECLOCK Phase Statistics**
///
/// Display: "N rows, E events, M missing employee, T missing timestamp"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeclockStats {
    pub rows_read: usize,
    pub missing_employee: usize,
    pub missing_timestamp: usize,
    pub events_emitted: usize,
    pub spans_from_transaction_date: usize,
    pub spans_completed_from_one_endpoint: usize,
    pub reversed_pairs_repaired: usize,
    pub anchored_dates: usize,
    pub unanchored_kept: usize,
    pub pto_rows: usize,
    pub single_event_rows: usize,
}

impl TimeclockStats {
    pub fn record_flags(&mut self, flags: &ReconstructionFlags) {
        self.anchored_dates += flags.anchored_dates;
        self.unanchored_kept += flags.unanchored_kept;
        self.spans_from_transaction_date += usize::from(flags.span_from_transaction_date);
        self.spans_completed_from_one_endpoint += usize::from(flags.span_completed_from_one_endpoint);
        self.reversed_pairs_repaired += usize::from(flags.reversed_pair_repaired);
        self.pto_rows += usize::from(flags.pto);
        self.single_event_rows += usize::from(flags.single_event);
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} rows, {} events, {} missing employee, {} missing timestamp \
             ({} synthesized, {} completed, {} repaired, {} anchored, {} unanchored)",
            self.rows_read,
            self.events_emitted,
            self.missing_employee,
            self.missing_timestamp,
            self.spans_from_transaction_date,
            self.spans_completed_from_one_endpoint,
            self.reversed_pairs_repaired,
            self.anchored_dates,
            self.unanchored_kept
        )
    }
}

/// Everything counted during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatistics {
    pub customers: SectionStats,
    pub vendors: SectionStats,
    pub employees: SectionStats,
    pub timeclock: TimeclockStats,
    pub sublet_providers: SectionStats,
    /// Vendors per canonical category code
    pub vendor_categories: BTreeMap<String, usize>,
}

impl MigrationStatistics {
    /// Entities created across all sections
    pub fn entities_created(&self) -> usize {
        [&self.customers, &self.vendors, &self.employees, &self.sublet_providers]
            .iter()
            .map(|s| s.entities_created)
            .sum()
    }
}

/// Result of a migration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub statistics: MigrationStatistics,
}

impl MigrationReport {
    pub fn display_string(&self) -> String {
        let categories = self
            .statistics
            .vendor_categories
            .iter()
            .map(|(code, count)| format!("{}={}", code, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "run {}{}: {} entities created, {} time events; vendor categories [{}]",
            self.run_id,
            if self.dry_run { " (dry run)" } else { "" },
            self.statistics.entities_created(),
            self.statistics.timeclock.events_emitted,
            categories
        )
    }
}
