//! Target database connection and base table creation
//!
//! The target database is the main schema of every pooled connection. When a
//! legacy database is configured it is attached under its schema alias on
//! each new connection, so legacy and target tables are reachable through
//! one pool.

use crate::config::validate_schema_name;
use crate::db::models::{
    LookupTable, RoleCode, ADDRESS_TYPES, EMAIL_TYPES, EMPLOYEE_STATUSES, PHONE_TYPES,
};
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Legacy database to attach alongside the target
#[derive(Debug, Clone)]
pub struct LegacyAttachment {
    pub path: PathBuf,
    pub schema: String,
}

impl LegacyAttachment {
    pub fn new(path: impl Into<PathBuf>, schema: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            schema: schema.into(),
        }
    }

    fn attach_sql(&self) -> String {
        let path = self.path.display().to_string().replace('\'', "''");
        format!("ATTACH DATABASE '{}' AS {}", path, self.schema)
    }
}

/// Open the target database, creating the file if needed
///
/// The pool holds a single connection: a migration run is strictly
/// sequential and SQLite attachments are per connection.
pub async fn open_target_pool(
    target_db: &Path,
    legacy: Option<&LegacyAttachment>,
) -> Result<SqlitePool> {
    let newly_created = !target_db.exists();

    if let Some(parent) = target_db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let attach_sql = match legacy {
        Some(attachment) => {
            validate_schema_name(&attachment.schema)?;
            if !attachment.path.exists() {
                return Err(Error::Config(format!(
                    "Legacy database not found: {}",
                    attachment.path.display()
                )));
            }
            Some(attachment.attach_sql())
        }
        None => None,
    };

    let options = SqliteConnectOptions::new()
        .filename(target_db)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(move |conn, _meta| {
            let attach_sql = attach_sql.clone();
            Box::pin(async move {
                if let Some(sql) = attach_sql {
                    sqlx::query(&sql).execute(&mut *conn).await?;
                }
                Ok(())
            })
        })
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new target database: {}", target_db.display());
    } else {
        info!("Opened existing target database: {}", target_db.display());
    }
    if let Some(attachment) = legacy {
        info!(
            "Attached legacy database {} as '{}'",
            attachment.path.display(),
            attachment.schema
        );
    }

    Ok(pool)
}

/// Create every base table and index (idempotent)
pub async fn create_base_tables(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_entities_table(pool).await?;
    create_persons_table(pool).await?;
    create_organizations_table(pool).await?;
    create_roles_tables(pool).await?;

    for table in [
        LookupTable::PhoneTypes,
        LookupTable::EmailTypes,
        LookupTable::AddressTypes,
        LookupTable::CustomerTypes,
        LookupTable::PricingPlans,
        LookupTable::EmployeeStatuses,
        LookupTable::VendorCategories,
    ] {
        create_lookup_table(pool, table).await?;
    }

    create_profile_tables(pool).await?;
    create_contact_tables(pool).await?;
    Ok(())
}

pub async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_entities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL CHECK (kind IN ('PERSON', 'ORGANIZATION')),
            display_name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entities_display_name ON entities(display_name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_persons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            first_name TEXT NOT NULL DEFAULT '',
            middle_name TEXT,
            last_name TEXT NOT NULL DEFAULT '',
            date_of_birth TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_persons_name ON persons(last_name, first_name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_organizations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            org_type TEXT NOT NULL DEFAULT 'BUSINESS'
                CHECK (org_type IN ('BUSINESS', 'GOVERNMENT', 'FINANCIAL', 'OTHER')),
            legal_name TEXT NOT NULL,
            trade_name TEXT,
            tax_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_organizations_legal_name ON organizations(legal_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_roles_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            code TEXT PRIMARY KEY,
            description TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entity_roles (
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            role_code TEXT NOT NULL REFERENCES roles(code),
            assigned_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (entity_id, role_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entity_roles_role ON entity_roles(role_code)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create one lookup table: surrogate id plus a unique name or code
pub async fn create_lookup_table(pool: &SqlitePool, table: LookupTable) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {} TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        table.table_name(),
        table.key_column()
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

async fn create_profile_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customer_profiles (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            legacy_customer_id TEXT UNIQUE,
            customer_type_id INTEGER REFERENCES customer_types(id),
            pricing_plan_id INTEGER REFERENCES pricing_plans(id),
            credit_limit REAL,
            tax_exempt INTEGER NOT NULL DEFAULT 0,
            tax_id TEXT,
            allow_charge INTEGER NOT NULL DEFAULT 1,
            send_statements INTEGER NOT NULL DEFAULT 1,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vendor_profiles (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            legacy_vendor_id TEXT UNIQUE,
            vendor_category_id INTEGER REFERENCES vendor_categories(id),
            legacy_category TEXT,
            account_number TEXT,
            tax_id TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employee_profiles (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            legacy_employee_id TEXT UNIQUE,
            employee_status_id INTEGER REFERENCES employee_statuses(id),
            job_title TEXT,
            hire_date TEXT,
            termination_date TEXT,
            pay_rate REAL,
            pay_type TEXT,
            is_timeclock_enabled INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sublet_provider_profiles (
            entity_id INTEGER PRIMARY KEY REFERENCES entities(id) ON DELETE CASCADE,
            legacy_company_name TEXT UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_contact_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entity_phones (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            phone_type_id INTEGER NOT NULL REFERENCES phone_types(id),
            number TEXT NOT NULL,
            is_primary INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (entity_id, phone_type_id, number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entity_emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            email_type_id INTEGER NOT NULL REFERENCES email_types(id),
            email TEXT NOT NULL,
            is_primary INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (entity_id, email_type_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Blank address parts are stored as '' so the composite key holds
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entity_addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            address_type_id INTEGER NOT NULL REFERENCES address_types(id),
            line1 TEXT NOT NULL DEFAULT '',
            line2 TEXT,
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            postal_code TEXT NOT NULL DEFAULT '',
            is_primary INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (entity_id, address_type_id, line1, city, state, postal_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed roles and contact/status type names (INSERT OR IGNORE)
pub async fn seed_reference_data(pool: &SqlitePool) -> Result<()> {
    for role in RoleCode::ALL {
        sqlx::query("INSERT OR IGNORE INTO roles (code, description) VALUES (?, ?)")
            .bind(role.code())
            .bind(role.description())
            .execute(pool)
            .await?;
    }

    seed_names(pool, LookupTable::PhoneTypes, &PHONE_TYPES).await?;
    seed_names(pool, LookupTable::EmailTypes, &EMAIL_TYPES).await?;
    seed_names(pool, LookupTable::AddressTypes, &ADDRESS_TYPES).await?;
    seed_names(pool, LookupTable::EmployeeStatuses, &EMPLOYEE_STATUSES).await?;

    info!("Reference data seeded");
    Ok(())
}

async fn seed_names(pool: &SqlitePool, table: LookupTable, names: &[&str]) -> Result<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES (?)",
        table.table_name(),
        table.key_column()
    );
    for name in names {
        sqlx::query(&sql).bind(name).execute(pool).await?;
    }
    debug!("Seeded {} rows into {}", names.len(), table.table_name());
    Ok(())
}

/// Seed a code table with descriptions (INSERT OR IGNORE)
pub async fn seed_codes(
    pool: &SqlitePool,
    table: LookupTable,
    codes: &[(&str, &str)],
) -> Result<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}, description) VALUES (?, ?)",
        table.table_name(),
        table.key_column()
    );
    for (code, description) in codes {
        sqlx::query(&sql)
            .bind(code)
            .bind(description)
            .execute(pool)
            .await?;
    }
    debug!("Seeded {} rows into {}", codes.len(), table.table_name());
    Ok(())
}
