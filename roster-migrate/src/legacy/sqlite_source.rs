//! Legacy source over an attached SQLite database
//!
//! The legacy file is attached to the target connection under a schema
//! alias (see `roster_common::db::open_target_pool`), so legacy tables are
//! read as `<alias>.<table>` through the same pool.

use super::row::LegacyRow;
use super::value::LegacyValue;
use super::LegacySource;
use roster_common::config::validate_schema_name;
use roster_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const CUSTOMERS_TABLE: &str = "customers";
pub const VENDORS_TABLE: &str = "vendors";
pub const EMPLOYEES_TABLE: &str = "employees";
pub const SUBLET_WORK_ORDERS_TABLE: &str = "sublet_work_orders";
pub const TIMECLOCK_TABLE: &str = "timeclock";
pub const TRANSACTION_TYPES_TABLE: &str = "transaction_types";

pub struct SqliteLegacySource {
    pool: SqlitePool,
    schema: String,
}

impl SqliteLegacySource {
    /// Read legacy tables from `schema` on `pool`
    pub fn new(pool: SqlitePool, schema: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        Ok(Self { pool, schema })
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {}.sqlite_master WHERE type = 'table' AND name = ?)",
            self.schema
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn require_table(&self, table: &str) -> Result<()> {
        if self.table_exists(table).await? {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Legacy table {}.{} not found",
                self.schema, table
            )))
        }
    }

    async fn fetch(&self, table: &str, sql: &str) -> Result<Vec<LegacyRow>> {
        self.require_table(table).await?;

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        let decoded = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

        debug!("Read {} rows from {}.{}", decoded.len(), self.schema, table);
        Ok(decoded)
    }

    async fn fetch_table(&self, table: &str) -> Result<Vec<LegacyRow>> {
        let sql = format!("SELECT * FROM {}.{} ORDER BY rowid", self.schema, table);
        self.fetch(table, &sql).await
    }
}

/// Decode every column by its runtime storage class
fn decode_row(row: &SqliteRow) -> Result<LegacyRow> {
    let mut decoded = LegacyRow::new();

    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            LegacyValue::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => LegacyValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" | "NUMERIC" => LegacyValue::Real(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => {
                    let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
                    LegacyValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => LegacyValue::Text(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        decoded.push(column.name(), value);
    }

    Ok(decoded)
}

#[async_trait::async_trait]
impl LegacySource for SqliteLegacySource {
    fn name(&self) -> &str {
        &self.schema
    }

    async fn customers(&self) -> Result<Vec<LegacyRow>> {
        self.fetch_table(CUSTOMERS_TABLE).await
    }

    async fn vendors(&self) -> Result<Vec<LegacyRow>> {
        self.fetch_table(VENDORS_TABLE).await
    }

    async fn employees(&self) -> Result<Vec<LegacyRow>> {
        self.fetch_table(EMPLOYEES_TABLE).await
    }

    async fn sublet_companies(&self) -> Result<Vec<LegacyRow>> {
        let sql = format!(
            "SELECT DISTINCT company_name FROM {}.{} \
             WHERE company_name IS NOT NULL ORDER BY company_name",
            self.schema, SUBLET_WORK_ORDERS_TABLE
        );
        self.fetch(SUBLET_WORK_ORDERS_TABLE, &sql).await
    }

    async fn time_punches(&self) -> Result<Vec<LegacyRow>> {
        self.fetch_table(TIMECLOCK_TABLE).await
    }

    /// Missing table degrades to an empty set: codes are then used verbatim
    async fn transaction_types(&self) -> Result<HashMap<String, String>> {
        if !self.table_exists(TRANSACTION_TYPES_TABLE).await? {
            warn!(
                "Legacy table {}.{} not found; transaction type codes used verbatim",
                self.schema, TRANSACTION_TYPES_TABLE
            );
            return Ok(HashMap::new());
        }

        let rows = self.fetch_table(TRANSACTION_TYPES_TABLE).await?;
        let mut labels = HashMap::new();
        for row in rows {
            let code = row.text(&["code", "transaction_type", "type_code"]);
            let label = row.text(&["description", "label", "name"]);
            if let (Some(code), Some(label)) = (code, label) {
                labels.insert(code, label);
            }
        }
        Ok(labels)
    }
}
