//! Canonical entity identifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a canonical entity
///
/// Positive values are persisted `entities.id` rows. Non-positive values are
/// placeholders handed out during a dry run; they are never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Whether this id refers to a persisted row
    pub fn is_materialized(&self) -> bool {
        self.0 > 0
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_materialized() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "placeholder({})", self.0)
        }
    }
}
