//! roster-migrate: legacy party migration engine
//!
//! Moves legacy customers, vendors, employees, sublet providers and
//! timeclock punches into the normalized entities + roles target model.
//! The `roster` binary wraps this library with the schema lifecycle
//! commands and `migrate [--dry-run]`.

pub mod db;
pub mod legacy;
pub mod models;
pub mod normalize;
pub mod services;

pub use crate::models::{EntityId, RunMode};
pub use crate::services::migration_orchestrator::{MigrationOrchestrator, MigrationReport};
