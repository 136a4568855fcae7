//! In-memory legacy source
//!
//! Used by tests and by callers that stage legacy rows themselves.

use super::row::LegacyRow;
use super::LegacySource;
use roster_common::Result;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryLegacySource {
    customers: Vec<LegacyRow>,
    vendors: Vec<LegacyRow>,
    employees: Vec<LegacyRow>,
    sublet_companies: Vec<LegacyRow>,
    time_punches: Vec<LegacyRow>,
    transaction_types: HashMap<String, String>,
}

impl MemoryLegacySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(mut self, rows: Vec<LegacyRow>) -> Self {
        self.customers = rows;
        self
    }

    pub fn with_vendors(mut self, rows: Vec<LegacyRow>) -> Self {
        self.vendors = rows;
        self
    }

    pub fn with_employees(mut self, rows: Vec<LegacyRow>) -> Self {
        self.employees = rows;
        self
    }

    /// Company names as they appear on sublet work orders; duplicates are collapsed
    pub fn with_sublet_companies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for name in names {
            let name = name.into();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        self.sublet_companies = seen
            .into_iter()
            .map(|name| LegacyRow::new().with("company_name", name))
            .collect();
        self
    }

    pub fn with_time_punches(mut self, rows: Vec<LegacyRow>) -> Self {
        self.time_punches = rows;
        self
    }

    pub fn with_transaction_type(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.transaction_types.insert(code.into(), label.into());
        self
    }
}

#[async_trait::async_trait]
impl LegacySource for MemoryLegacySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn customers(&self) -> Result<Vec<LegacyRow>> {
        Ok(self.customers.clone())
    }

    async fn vendors(&self) -> Result<Vec<LegacyRow>> {
        Ok(self.vendors.clone())
    }

    async fn employees(&self) -> Result<Vec<LegacyRow>> {
        Ok(self.employees.clone())
    }

    async fn sublet_companies(&self) -> Result<Vec<LegacyRow>> {
        Ok(self.sublet_companies.clone())
    }

    async fn time_punches(&self) -> Result<Vec<LegacyRow>> {
        Ok(self.time_punches.clone())
    }

    async fn transaction_types(&self) -> Result<HashMap<String, String>> {
        Ok(self.transaction_types.clone())
    }
}
