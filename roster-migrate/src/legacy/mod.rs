//! Legacy record ingestion
//!
//! A [`LegacySource`] yields legacy rows for each record family in source
//! order. Every call starts from the beginning, so a failed run can simply
//! be repeated.

pub mod memory_source;
pub mod records;
pub mod row;
pub mod sqlite_source;
pub mod value;

pub use memory_source::MemoryLegacySource;
pub use records::{
    AddressFields, CustomerRecord, EmployeeRecord, PersonName, PunchRecord, SubletCompanyRecord,
    VendorRecord,
};
pub use row::LegacyRow;
pub use sqlite_source::SqliteLegacySource;
pub use value::{legacy_epoch, parse_legacy_timestamp, LegacyValue};

use roster_common::Result;
use std::collections::HashMap;

/// Read side of the legacy system
#[async_trait::async_trait]
pub trait LegacySource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    async fn customers(&self) -> Result<Vec<LegacyRow>>;

    async fn vendors(&self) -> Result<Vec<LegacyRow>>;

    async fn employees(&self) -> Result<Vec<LegacyRow>>;

    /// Distinct company names referenced by sublet work orders
    async fn sublet_companies(&self) -> Result<Vec<LegacyRow>>;

    async fn time_punches(&self) -> Result<Vec<LegacyRow>>;

    /// Transaction type code to label
    async fn transaction_types(&self) -> Result<HashMap<String, String>>;
}
