//! Test Helper Utilities
//!
//! Shared utilities for testing roster-migrate

#![allow(dead_code)]

pub mod db_utils;
pub mod legacy_fixtures;

// Re-export commonly used items
pub use db_utils::{count_rows, create_test_db, run_migration, table_counts};
pub use legacy_fixtures::{create_legacy_db, sample_source};
