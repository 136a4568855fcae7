//! Target schema lifecycle: create, drop, update
//!
//! Create and update run the same phases:
//! 1. CREATE TABLE IF NOT EXISTS for the base tables
//! 2. Column synchronization (missing columns added)
//! 3. Versioned migrations
//! 4. Reference data seeding (INSERT OR IGNORE)
//!
//! Every phase is idempotent, so `create` on an existing target and `update`
//! on a current one change nothing.

use crate::db::init::{create_base_tables, seed_reference_data};
use crate::db::migrations::{run_migrations, seed_timeclock_codes};
use crate::db::schema_sync::SchemaIntrospector;
use crate::db::table_schemas::sync_all_table_schemas;
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Tables in dependency order (referenced tables first)
pub const TARGET_TABLES: [&str; 24] = [
    "schema_version",
    "entities",
    "persons",
    "organizations",
    "roles",
    "entity_roles",
    "phone_types",
    "email_types",
    "address_types",
    "customer_types",
    "pricing_plans",
    "employee_statuses",
    "vendor_categories",
    "customer_profiles",
    "vendor_profiles",
    "employee_profiles",
    "sublet_provider_profiles",
    "entity_phones",
    "entity_emails",
    "entity_addresses",
    "timeclock_action_types",
    "timeclock_entry_types",
    "work_sessions",
    "time_events",
];

/// What a create or update pass changed
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaReport {
    pub columns_added: usize,
    pub migrations_applied: usize,
}

impl SchemaReport {
    pub fn display_string(&self) -> String {
        format!(
            "{} columns added, {} migrations applied",
            self.columns_added, self.migrations_applied
        )
    }
}

/// Create every target table and seed reference data
pub async fn create_schema(pool: &SqlitePool) -> Result<SchemaReport> {
    info!("Creating target schema");
    let report = apply_schema(pool).await?;
    info!("Target schema ready: {}", report.display_string());
    Ok(report)
}

/// Bring an existing target up to date without dropping anything
pub async fn update_schema(pool: &SqlitePool) -> Result<SchemaReport> {
    info!("Updating target schema");
    let report = apply_schema(pool).await?;
    info!("Target schema updated: {}", report.display_string());
    Ok(report)
}

async fn apply_schema(pool: &SqlitePool) -> Result<SchemaReport> {
    create_base_tables(pool).await?;
    let columns_added = sync_all_table_schemas(pool).await?;
    let migrations_applied = run_migrations(pool).await?;

    seed_reference_data(pool).await?;
    seed_timeclock_codes(pool).await?;

    Ok(SchemaReport {
        columns_added,
        migrations_applied,
    })
}

/// Drop every target table, dependents first; returns the number dropped
pub async fn drop_schema(pool: &SqlitePool) -> Result<usize> {
    info!("Dropping target schema");

    let mut dropped = 0;
    for table in TARGET_TABLES.iter().rev() {
        if SchemaIntrospector::table_exists(pool, table).await? {
            sqlx::query(&format!("DROP TABLE {}", table))
                .execute(pool)
                .await?;
            dropped += 1;
        }
    }

    info!("Dropped {} target tables", dropped);
    Ok(dropped)
}

/// Fail with a configuration error unless every target table exists
pub async fn verify_target_schema(pool: &SqlitePool) -> Result<()> {
    let mut missing = Vec::new();
    for table in TARGET_TABLES {
        if !SchemaIntrospector::table_exists(pool, table).await? {
            missing.push(table);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Target schema incomplete (missing: {}). Run `roster create` or `roster update` first",
            missing.join(", ")
        )))
    }
}
