//! Database Test Utilities
//!
//! Temporary target databases and row-count snapshots

use anyhow::Result;
use roster_common::db::{create_schema, open_target_pool, TARGET_TABLES};
use roster_migrate::legacy::LegacySource;
use roster_migrate::{MigrationOrchestrator, MigrationReport, RunMode};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Create temporary target database with the schema created
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let pool = open_target_pool(&temp_dir.path().join("target.db"), None).await?;
    create_schema(&pool).await?;
    Ok((temp_dir, pool))
}

/// Row count of one table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Row count of every target table
pub async fn table_counts(pool: &SqlitePool) -> BTreeMap<&'static str, i64> {
    let mut counts = BTreeMap::new();
    for table in TARGET_TABLES {
        counts.insert(table, count_rows(pool, table).await);
    }
    counts
}

/// Run one migration over `source`
pub async fn run_migration(
    pool: &SqlitePool,
    source: impl LegacySource + 'static,
    mode: RunMode,
) -> Result<MigrationReport> {
    let report = MigrationOrchestrator::new(pool.clone(), Box::new(source), mode)
        .run()
        .await?;
    Ok(report)
}
