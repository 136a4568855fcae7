//! # Roster Common Library
//!
//! Shared code for the roster migration tooling:
//! - Error type
//! - Configuration resolution (CLI → ENV → TOML → default)
//! - Domain code enumerations for the target model
//! - Target database connection and schema lifecycle (create / drop / update)
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
