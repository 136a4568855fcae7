//! Live versus dry run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Every decision is written to the target
    #[default]
    Live,
    /// Every read and decision happens; no write is issued
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }

    /// Writes are issued only in a live run
    pub fn writes(&self) -> bool {
        !self.is_dry_run()
    }
}
