//! Table schema definitions
//!
//! Expected columns for the tables whose shape has grown since the first
//! release. Older target databases pick up the newer columns through
//! `sync_all_table_schemas` during `update`.

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

pub struct EntitiesTableSchema;

impl TableSchema for EntitiesTableSchema {
    fn table_name() -> &'static str {
        "entities"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("kind", "TEXT").not_null(),
            ColumnDefinition::new("display_name", "TEXT").not_null(),
            ColumnDefinition::new("is_active", "INTEGER").not_null().default("1"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
            ColumnDefinition::new("updated_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

pub struct CustomerProfilesTableSchema;

impl TableSchema for CustomerProfilesTableSchema {
    fn table_name() -> &'static str {
        "customer_profiles"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("entity_id", "INTEGER").primary_key(),
            ColumnDefinition::new("legacy_customer_id", "TEXT").unique(),
            ColumnDefinition::new("customer_type_id", "INTEGER").references("customer_types(id)"),
            ColumnDefinition::new("pricing_plan_id", "INTEGER").references("pricing_plans(id)"),
            ColumnDefinition::new("credit_limit", "REAL"),
            ColumnDefinition::new("tax_exempt", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("tax_id", "TEXT"),
            ColumnDefinition::new("allow_charge", "INTEGER").not_null().default("1"),
            ColumnDefinition::new("send_statements", "INTEGER").not_null().default("1"),
            ColumnDefinition::new("notes", "TEXT"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// Vendor profiles
///
/// `legacy_category` keeps the raw legacy text next to the classified id
/// so unclassified vendors can be reviewed later.
pub struct VendorProfilesTableSchema;

impl TableSchema for VendorProfilesTableSchema {
    fn table_name() -> &'static str {
        "vendor_profiles"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("entity_id", "INTEGER").primary_key(),
            ColumnDefinition::new("legacy_vendor_id", "TEXT").unique(),
            ColumnDefinition::new("vendor_category_id", "INTEGER")
                .references("vendor_categories(id)"),
            ColumnDefinition::new("legacy_category", "TEXT"),
            ColumnDefinition::new("account_number", "TEXT"),
            ColumnDefinition::new("tax_id", "TEXT"),
            ColumnDefinition::new("is_active", "INTEGER").not_null().default("1"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

pub struct EmployeeProfilesTableSchema;

impl TableSchema for EmployeeProfilesTableSchema {
    fn table_name() -> &'static str {
        "employee_profiles"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("entity_id", "INTEGER").primary_key(),
            ColumnDefinition::new("legacy_employee_id", "TEXT").unique(),
            ColumnDefinition::new("employee_status_id", "INTEGER")
                .references("employee_statuses(id)"),
            ColumnDefinition::new("job_title", "TEXT"),
            ColumnDefinition::new("hire_date", "TEXT"),
            ColumnDefinition::new("termination_date", "TEXT"),
            ColumnDefinition::new("pay_rate", "REAL"),
            ColumnDefinition::new("pay_type", "TEXT"),
            ColumnDefinition::new("is_timeclock_enabled", "INTEGER")
                .not_null()
                .default("1"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// Add missing columns to every declared table
///
/// Runs after CREATE TABLE IF NOT EXISTS and before versioned migrations.
pub async fn sync_all_table_schemas(pool: &SqlitePool) -> Result<usize> {
    info!("Synchronizing table schemas");

    let mut added = 0;
    added += SchemaSync::sync_table::<EntitiesTableSchema>(pool).await?;
    added += SchemaSync::sync_table::<CustomerProfilesTableSchema>(pool).await?;
    added += SchemaSync::sync_table::<VendorProfilesTableSchema>(pool).await?;
    added += SchemaSync::sync_table::<EmployeeProfilesTableSchema>(pool).await?;

    info!("Schema synchronization complete ({} columns added)", added);
    Ok(added)
}
