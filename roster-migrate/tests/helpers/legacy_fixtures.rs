//! Legacy data fixtures
//!
//! One small legacy shop: four customers (two unrelated John Smiths, a
//! fleet company and a nameless walk-in), four vendors (one without a
//! name), two employees, six punches and two sublet companies, one of them
//! also a vendor.

use anyhow::Result;
use roster_migrate::legacy::{LegacyRow, MemoryLegacySource};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};

pub fn customer_rows() -> Vec<LegacyRow> {
    vec![
        LegacyRow::new()
            .with("customer_id", "C1")
            .with("first_name", "John")
            .with("last_name", "Smith")
            .with("address1", "12 Oak St")
            .with("zip", "11111")
            .with("home_phone", "555-0100")
            .with("mobile_phone", "555-0101")
            .with("email", "john@example.com")
            .with("customer_type", "Retail")
            .with("credit_limit", "$1,500.00"),
        LegacyRow::new()
            .with("customer_id", "C2")
            .with("first_name", "JOHN")
            .with("last_name", " smith ")
            .with("address1", "99 Elm Ave")
            .with("zip", "22222"),
        LegacyRow::new()
            .with("customer_id", "C3")
            .with("first_name", "Pat")
            .with("last_name", "Lee")
            .with("company_name", "Big Fleet LLC")
            .with("work_phone", "555-0200")
            .with("tax_exempt", "Y"),
        LegacyRow::new()
            .with("customer_id", "C4")
            .with("first_name", "")
            .with("last_name", ""),
    ]
}

pub fn vendor_rows() -> Vec<LegacyRow> {
    vec![
        LegacyRow::new()
            .with("vendor_id", "V1")
            .with("vendor_name", "Acme Supply Co")
            .with("category", "Auto Parts")
            .with("phone", "555-0300"),
        LegacyRow::new()
            .with("vendor_id", "V2")
            .with("vendor_name", "First National Bank")
            .with("category", "bank"),
        LegacyRow::new()
            .with("vendor_id", "V3")
            .with("vendor_name", "   ")
            .with("category", "Parts"),
        LegacyRow::new()
            .with("vendor_id", "V4")
            .with("vendor_name", "Tow Pros")
            .with("category", "misc"),
    ]
}

pub fn employee_rows() -> Vec<LegacyRow> {
    vec![
        LegacyRow::new()
            .with("employee_id", "E1")
            .with("first_name", "Jane")
            .with("last_name", "Doe")
            .with("hire_date", "03/15/2019")
            .with("pay_rate", "24.50"),
        LegacyRow::new()
            .with("employee_id", "E2")
            .with("first_name", "Bob")
            .with("last_name", "Roe")
            .with("termination_date", "2023-06-30"),
    ]
}

pub fn punch_rows() -> Vec<LegacyRow> {
    vec![
        // Regular span
        LegacyRow::new()
            .with("employee_id", "E1")
            .with("clock_in", "2024-01-02 08:00:00")
            .with("clock_out", "2024-01-02 16:30:00")
            .with("transaction_type", "REG"),
        // Transaction date only
        LegacyRow::new()
            .with("employee_id", "E1")
            .with("transaction_date", "2024-01-03")
            .with("transaction_type", "REG"),
        // Reversed pair, time-only values anchored to the transaction date
        LegacyRow::new()
            .with("employee_id", "E2")
            .with("clock_in", "09:00:00")
            .with("clock_out", "08:00:00")
            .with("transaction_date", "2024-01-04"),
        // Paid time off
        LegacyRow::new()
            .with("employee_id", "E1")
            .with("clock_in", "2024-01-05 08:00:00")
            .with("clock_out", "2024-01-05 12:00:00")
            .with("transaction_type", "PTO"),
        // Unknown employee
        LegacyRow::new()
            .with("employee_id", "E9")
            .with("clock_in", "2024-01-02 08:00:00"),
        // No usable timestamp
        LegacyRow::new()
            .with("employee_id", "E2")
            .with("clock_in", "0000-00-00 00:00:00"),
    ]
}

pub const SUBLET_COMPANIES: [&str; 2] = ["Acme Supply Co", "Quick Glass"];

/// The sample shop as an in-memory source
pub fn sample_source() -> MemoryLegacySource {
    MemoryLegacySource::new()
        .with_customers(customer_rows())
        .with_vendors(vendor_rows())
        .with_employees(employee_rows())
        .with_time_punches(punch_rows())
        .with_sublet_companies(SUBLET_COMPANIES)
        .with_transaction_type("REG", "Regular")
        .with_transaction_type("PTO", "Paid Time Off")
}

/// Write the sample shop as a legacy SQLite file in `dir`
pub async fn create_legacy_db(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("legacy.db");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    for ddl in [
        "CREATE TABLE customers (customer_id TEXT, first_name TEXT, last_name TEXT, \
         company_name TEXT, address1 TEXT, zip TEXT, home_phone TEXT, credit_limit REAL, \
         tax_exempt INTEGER)",
        "CREATE TABLE vendors (vendor_id INTEGER, vendor_name TEXT, category TEXT, phone TEXT)",
        "CREATE TABLE employees (employee_id INTEGER, first_name TEXT, last_name TEXT, \
         status TEXT)",
        "CREATE TABLE sublet_work_orders (work_order INTEGER, company_name TEXT)",
        "CREATE TABLE timeclock (employee_id INTEGER, clock_in TEXT, clock_out TEXT, \
         transaction_date TEXT, transaction_type TEXT)",
        "CREATE TABLE transaction_types (code TEXT, description TEXT)",
    ] {
        sqlx::query(ddl).execute(&pool).await?;
    }

    for dml in [
        "INSERT INTO customers VALUES ('C1', 'John', 'Smith', NULL, '12 Oak St', '11111', \
         '555-0100', 2500.0, 0)",
        "INSERT INTO customers VALUES ('C2', NULL, NULL, 'Big Fleet LLC', NULL, NULL, NULL, NULL, 1)",
        "INSERT INTO vendors VALUES (101, 'Acme Supply Co', 'PARTS', '555-0300')",
        "INSERT INTO vendors VALUES (102, 'County Treasurer', 'Taxes/Government', NULL)",
        "INSERT INTO employees VALUES (7, 'Jane', 'Doe', 'Active')",
        "INSERT INTO sublet_work_orders VALUES (1, 'Acme Supply Co')",
        "INSERT INTO sublet_work_orders VALUES (2, 'Acme Supply Co')",
        "INSERT INTO sublet_work_orders VALUES (3, 'Quick Glass')",
        "INSERT INTO timeclock VALUES (7, '2024-02-01 07:30:00', '2024-02-01 15:45:00', NULL, 'R')",
        "INSERT INTO timeclock VALUES (7, NULL, NULL, '2024-02-02', 'R')",
        "INSERT INTO transaction_types VALUES ('R', 'Regular')",
    ] {
        sqlx::query(dml).execute(&pool).await?;
    }

    pool.close().await;
    Ok(path)
}
