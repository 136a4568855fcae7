//! Versioned schema migrations
//!
//! Each migration is additive and checks before it changes anything, so a
//! partially applied migration can simply be re-run. Applied versions are
//! recorded in `schema_version`.
//!
//! Never modify a released migration; add a new one and bump
//! `CURRENT_SCHEMA_VERSION`.

use crate::db::init::{create_lookup_table, create_schema_version_table, seed_codes};
use crate::db::models::{EntryType, LookupTable, TimeAction};
use crate::db::schema_sync::{ColumnDefinition, SchemaIntrospector, SchemaSync};
use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Latest applied version, 0 when nothing has been applied
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    if !SchemaIntrospector::table_exists(pool, "schema_version").await? {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations; returns the number applied
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    create_schema_version_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Target schema is up to date (v{})", current_version);
        return Ok(0);
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Target schema version ({}) is newer than this build ({}); leaving it untouched",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(0);
    }

    info!(
        "Running schema migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    let mut applied = 0;

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        applied += 1;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        applied += 1;
        info!("Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        applied += 1;
        info!("Migration v3 completed");
    }

    Ok(applied)
}

/// Timeclock action and entry type codes
pub async fn seed_timeclock_codes(pool: &SqlitePool) -> Result<()> {
    let actions: Vec<(&str, &str)> = TimeAction::ALL
        .iter()
        .map(|a| (a.code(), a.description()))
        .collect();
    seed_codes(pool, LookupTable::TimeclockActionTypes, &actions).await?;

    let entries: Vec<(&str, &str)> = EntryType::ALL
        .iter()
        .map(|e| (e.code(), e.description()))
        .collect();
    seed_codes(pool, LookupTable::TimeclockEntryTypes, &entries).await?;

    Ok(())
}

/// Migration v1: timeclock reference tables and their codes
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: timeclock reference tables");

    create_lookup_table(pool, LookupTable::TimeclockActionTypes).await?;
    create_lookup_table(pool, LookupTable::TimeclockEntryTypes).await?;
    seed_timeclock_codes(pool).await?;

    Ok(())
}

/// Migration v2: work sessions and time events
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: work_sessions and time_events");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            started_at TIMESTAMP NOT NULL,
            ended_at TIMESTAMP,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            action_type_id INTEGER NOT NULL REFERENCES timeclock_action_types(id),
            occurred_at TIMESTAMP NOT NULL,
            entry_type_id INTEGER NOT NULL REFERENCES timeclock_entry_types(id),
            minutes REAL,
            note TEXT,
            work_session_id INTEGER REFERENCES work_sessions(id) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    if !SchemaIntrospector::index_exists(pool, "idx_time_events_unique").await? {
        sqlx::query(
            "CREATE UNIQUE INDEX idx_time_events_unique \
             ON time_events(entity_id, action_type_id, occurred_at)",
        )
        .execute(pool)
        .await?;
        info!("  Created idx_time_events_unique");
    }

    Ok(())
}

/// Migration v3: voiding columns and the per-entity timeline index
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: time event voiding");

    let columns = [
        ColumnDefinition::new("voided_at", "TIMESTAMP"),
        ColumnDefinition::new("voided_by", "INTEGER").references("entities(id)"),
        ColumnDefinition::new("void_reason", "TEXT"),
    ];

    for column in &columns {
        if !SchemaIntrospector::column_exists(pool, "time_events", &column.name).await? {
            SchemaSync::add_column(pool, "time_events", column).await?;
        }
    }

    if !SchemaIntrospector::index_exists(pool, "idx_time_events_entity_time").await? {
        sqlx::query(
            "CREATE INDEX idx_time_events_entity_time ON time_events(entity_id, occurred_at)",
        )
        .execute(pool)
        .await?;
        info!("  Created idx_time_events_entity_time");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_base_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_base_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_schema_version_no_table() {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_migrations_complete_flow() {
        let pool = setup_test_db().await;

        let applied = run_migrations(&pool).await.unwrap();
        assert_eq!(applied, 3);
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        let action_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timeclock_action_types")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(action_count, TimeAction::ALL.len() as i64);

        assert!(SchemaIntrospector::column_exists(&pool, "time_events", "void_reason")
            .await
            .unwrap());
        assert!(SchemaIntrospector::index_exists(&pool, "idx_time_events_unique")
            .await
            .unwrap());

        // Second run applies nothing
        assert_eq!(run_migrations(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migrate_v3_tolerates_partial_application() {
        let pool = setup_test_db().await;
        migrate_v1(&pool).await.unwrap();
        migrate_v2(&pool).await.unwrap();
        set_schema_version(&pool, 2).await.unwrap();

        // Column added by hand before v3 was recorded
        sqlx::query("ALTER TABLE time_events ADD COLUMN voided_at TIMESTAMP")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(run_migrations(&pool).await.unwrap(), 1);
        assert!(SchemaIntrospector::column_exists(&pool, "time_events", "voided_by")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_time_events_reject_duplicate_punch() {
        let pool = setup_test_db().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO entities (id, kind, display_name) VALUES (1, 'PERSON', 'A B')")
            .execute(&pool)
            .await
            .unwrap();

        let insert = "INSERT OR IGNORE INTO time_events \
             (entity_id, action_type_id, occurred_at, entry_type_id) \
             VALUES (1, 1, '2024-01-02 08:00:00', 1)";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let second = sqlx::query(insert).execute(&pool).await.unwrap();
        assert_eq!(second.rows_affected(), 0);
    }
}
