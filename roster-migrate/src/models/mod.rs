//! Data models for roster-migrate
//!
//! - `EntityId`: canonical entity identifier, or a dry-run placeholder
//! - `RunMode`: live run or dry run

pub mod entity_id;
pub mod run_mode;

pub use entity_id::EntityId;
pub use run_mode::RunMode;
