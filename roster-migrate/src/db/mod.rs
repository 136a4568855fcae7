//! Target database operations
//!
//! Free functions over the target pool, one module per table family.
//! Every writer is insert-if-absent, so repeated calls are no-ops.

pub mod contacts;
pub mod entities;
pub mod lookups;
pub mod roles;
pub mod time_events;
