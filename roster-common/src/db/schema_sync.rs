//! Additive schema synchronization
//!
//! Declarative column definitions in code are compared against the live
//! target schema; missing columns are added with `ALTER TABLE ADD COLUMN`.
//! Type or constraint drift is reported but never repaired, since that
//! would require rebuilding a table and the update command must not drop data.
//!
//! ```rust,ignore
//! pub struct VendorProfilesTableSchema;
//!
//! impl TableSchema for VendorProfilesTableSchema {
//!     fn table_name() -> &'static str { "vendor_profiles" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("entity_id", "INTEGER").primary_key(),
//!             ColumnDefinition::new("legacy_category", "TEXT"),
//!         ]
//!     }
//! }
//!
//! SchemaSync::sync_table::<VendorProfilesTableSchema>(&pool).await?;
//! ```

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL", "TIMESTAMP")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default_value: Option<String>,
    /// REFERENCES clause target, e.g. "entities(id)"
    pub references: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }
}

/// Column as reported by PRAGMA table_info
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub pk: bool,
}

/// Difference between the expected and the live schema
#[derive(Debug, Clone)]
pub enum SchemaDrift {
    /// Column missing from database (repairable)
    MissingColumn {
        table: String,
        column: ColumnDefinition,
    },
    /// Column type mismatch (reported only)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Constraint mismatch (reported only)
    ConstraintMismatch {
        table: String,
        column: String,
        constraint: String,
    },
}

/// Expected schema for one target table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Expected column definitions in declaration order
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Existence checks against the live schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read columns of a main-schema table, ordered by cid
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let rows = sqlx::query(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?)",
        )
        .bind(table_name)
        .fetch_all(pool)
        .await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
                not_null: row.get::<i32, _>("notnull") != 0,
                default_value: row.get("dflt_value"),
                pk: row.get::<i32, _>("pk") != 0,
            })
            .collect();

        columns.sort_by_key(|c| c.cid);
        Ok(columns)
    }

    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        Self::object_exists(pool, "table", table_name).await
    }

    pub async fn index_exists(pool: &SqlitePool, index_name: &str) -> Result<bool> {
        Self::object_exists(pool, "index", index_name).await
    }

    pub async fn column_exists(pool: &SqlitePool, table_name: &str, column_name: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
                .bind(table_name)
                .bind(column_name)
                .fetch_one(pool)
                .await?;
        Ok(count > 0)
    }

    async fn object_exists(pool: &SqlitePool, object_type: &str, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM main.sqlite_master
                WHERE type = ? AND name = ?
            )
            "#,
        )
        .bind(object_type)
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Schema comparison
pub struct SchemaDiff;

impl SchemaDiff {
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            let Some(actual_col) = actual.iter().find(|c| c.name == expected_col.name) else {
                drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.clone(),
                });
                continue;
            };

            if !Self::types_compatible(&expected_col.sql_type, &actual_col.type_name) {
                drift.push(SchemaDrift::TypeMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    expected: expected_col.sql_type.clone(),
                    actual: actual_col.type_name.clone(),
                });
            }

            if expected_col.not_null && !actual_col.not_null && !actual_col.pk {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "NOT NULL".to_string(),
                });
            }

            if expected_col.primary_key && !actual_col.pk {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "PRIMARY KEY".to_string(),
                });
            }
        }

        drift
    }

    /// SQLite type affinity comparison
    fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        let integer = |t: &str| t.contains("INT");
        let text = |t: &str| t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB");
        let real = |t: &str| t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB");

        (integer(&exp) && integer(&act)) || (text(&exp) && text(&act)) || (real(&exp) && real(&act))
    }
}

/// Applies repairable drift to the live schema
pub struct SchemaSync;

impl SchemaSync {
    /// Add missing columns to one table; returns the number of columns added
    ///
    /// A table that does not exist yet is left to the create step.
    pub async fn sync_table<T: TableSchema>(pool: &SqlitePool) -> Result<usize> {
        let table_name = T::table_name();

        if !SchemaIntrospector::table_exists(pool, table_name).await? {
            warn!("Schema sync: table '{}' does not exist yet, skipping", table_name);
            return Ok(0);
        }

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &T::expected_columns(), &actual);

        if drift.is_empty() {
            debug!("Schema sync: '{}' up to date", table_name);
            return Ok(0);
        }

        let mut added = 0;
        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                    added += 1;
                }
                SchemaDrift::TypeMismatch { table, column, expected, actual } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. Manual migration required.",
                        table, column, expected, actual
                    );
                }
                SchemaDrift::ConstraintMismatch { table, column, constraint } => {
                    warn!(
                        "Constraint mismatch in {}.{}: missing '{}'. Manual migration required.",
                        table, column, constraint
                    );
                }
            }
        }

        Ok(added)
    }

    /// Add one column via ALTER TABLE ADD COLUMN
    ///
    /// SQLite cannot add PRIMARY KEY or UNIQUE columns, and NOT NULL only
    /// with a DEFAULT; those constraints are dropped with a warning.
    pub async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table, column.name, column.sql_type
        );

        if column.primary_key || column.unique {
            warn!(
                "Column {}.{} added without its PRIMARY KEY/UNIQUE constraint",
                table, column.name
            );
        }

        // SQLite rejects non-constant defaults in ADD COLUMN; backfill instead
        if let Some(default) = column.default_value.as_deref().filter(|d| is_non_constant(d)) {
            if let Some(target) = &column.references {
                sql.push_str(&format!(" REFERENCES {}", target));
            }
            info!("Adding column {}.{} ({}, backfilled)", table, column.name, column.sql_type);
            Self::execute_add(pool, table, &column.name, &sql).await?;
            sqlx::query(&format!(
                "UPDATE {} SET {} = {} WHERE {} IS NULL",
                table, column.name, default, column.name
            ))
            .execute(pool)
            .await?;
            return Ok(());
        }

        match (&column.default_value, column.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Column {}.{} added as nullable: NOT NULL needs a DEFAULT",
                table, column.name
            ),
            (None, false) => {}
        }

        if let Some(target) = &column.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }

        info!("Adding column {}.{} ({})", table, column.name, column.sql_type);
        Self::execute_add(pool, table, &column.name, &sql).await
    }

    async fn execute_add(pool: &SqlitePool, table: &str, column: &str, sql: &str) -> Result<()> {
        match sqlx::query(sql).execute(pool).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                info!("Column {}.{} already present", table, column);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_non_constant(default: &str) -> bool {
    let upper = default.to_uppercase();
    upper.starts_with("CURRENT_") || upper.starts_with('(')
}
