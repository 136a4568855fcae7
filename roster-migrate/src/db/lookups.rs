//! Lookup resolver for small reference tables
//!
//! Rows are resolved by exact match on their unique name or code column
//! and created on first use. Nothing is cached: the unique constraint is
//! what keeps repeated calls idempotent.

use crate::models::RunMode;
use roster_common::db::LookupTable;
use roster_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Id handed out for a value a dry run would have created
pub const PLACEHOLDER_LOOKUP_ID: i64 = -1;

/// Id of the row whose key equals `value`, if any
pub async fn find(pool: &SqlitePool, table: LookupTable, value: &str) -> Result<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE {} = ?",
        table.table_name(),
        table.key_column()
    );
    let id: Option<i64> = sqlx::query_scalar(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Id of a seeded row; absence is a fatal missing reference
pub async fn require(pool: &SqlitePool, table: LookupTable, value: &str) -> Result<i64> {
    find(pool, table, value).await?.ok_or_else(|| {
        Error::MissingReference(format!(
            "{} '{}' is not seeded; run `roster create` or `roster update`",
            table.table_name(),
            value
        ))
    })
}

/// Resolve `value`, inserting it on first use
pub async fn resolve_or_create(
    pool: &SqlitePool,
    table: LookupTable,
    value: &str,
    mode: RunMode,
) -> Result<i64> {
    resolve_or_create_described(pool, table, value, None, mode).await
}

/// Resolve `value`, inserting it with `description` on first use
///
/// An existing row keeps its description.
pub async fn resolve_or_create_described(
    pool: &SqlitePool,
    table: LookupTable,
    value: &str,
    description: Option<&str>,
    mode: RunMode,
) -> Result<i64> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!(
            "blank value for lookup table {}",
            table.table_name()
        )));
    }

    if let Some(id) = find(pool, table, value).await? {
        return Ok(id);
    }

    if mode.is_dry_run() {
        debug!("Dry run: would add '{}' to {}", value, table.table_name());
        return Ok(PLACEHOLDER_LOOKUP_ID);
    }

    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}, description) VALUES (?, ?)",
        table.table_name(),
        table.key_column()
    );
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(description)
        .execute(pool)
        .await?;

    if result.rows_affected() == 1 {
        debug!("Added '{}' to {}", value, table.table_name());
        return Ok(result.last_insert_rowid());
    }

    require(pool, table, value).await
}
