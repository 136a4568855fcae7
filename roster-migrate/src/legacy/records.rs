//! Typed views over legacy rows
//!
//! Each view reads the fields its phase needs, applying the coercion rules
//! of [`LegacyValue`](super::value::LegacyValue). Column spellings vary
//! between legacy installs, so each field lists every accepted name.

use super::row::LegacyRow;
use chrono::{NaiveDate, NaiveDateTime};

const ADDRESS_LINE1: &[&str] = &["address1", "address_line1", "address", "street"];
const ADDRESS_LINE2: &[&str] = &["address2", "address_line2"];
const CITY: &[&str] = &["city"];
const STATE: &[&str] = &["state", "province"];
const POSTAL_CODE: &[&str] = &["zip", "zip_code", "postal_code", "zipcode"];
const FIRST_NAME: &[&str] = &["first_name", "firstname", "fname"];
const MIDDLE_NAME: &[&str] = &["middle_name", "middlename", "middle_initial", "mi"];
const LAST_NAME: &[&str] = &["last_name", "lastname", "lname"];
const EMAIL: &[&str] = &["email", "email_address"];
const TAX_ID: &[&str] = &["tax_id", "taxid", "ein", "fein"];

/// Postal address fields, each trimmed and optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressFields {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressFields {
    fn from_row(row: &LegacyRow) -> Self {
        Self {
            line1: row.text(ADDRESS_LINE1),
            line2: row.text(ADDRESS_LINE2),
            city: row.text(CITY),
            state: row.text(STATE),
            postal_code: row.text(POSTAL_CODE),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.line1.is_none()
            && self.line2.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
    }

    /// Person dedup discriminator: address line 1 plus postal code
    pub fn discriminator(&self) -> String {
        format!(
            "{} {}",
            self.line1.as_deref().unwrap_or_default(),
            self.postal_code.as_deref().unwrap_or_default()
        )
    }
}

/// Person name parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonName {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
}

impl PersonName {
    fn from_row(row: &LegacyRow) -> Self {
        Self {
            first: row.text(FIRST_NAME),
            middle: row.text(MIDDLE_NAME),
            last: row.text(LAST_NAME),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.first.is_none() && self.last.is_none()
    }

    /// "First Last", or `fallback` when both are blank
    pub fn display_name(&self, fallback: &str) -> String {
        let parts: Vec<&str> = [self.first.as_deref(), self.last.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            fallback.to_string()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub legacy_id: Option<String>,
    pub name: PersonName,
    pub company_name: Option<String>,
    pub address: AddressFields,
    pub home_phone: Option<String>,
    pub work_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub customer_type: Option<String>,
    pub pricing_plan: Option<String>,
    pub credit_limit: Option<f64>,
    pub tax_exempt: bool,
    pub tax_id: Option<String>,
    pub allow_charge: bool,
    pub send_statements: bool,
    pub notes: Option<String>,
}

impl CustomerRecord {
    pub fn from_row(row: &LegacyRow) -> Self {
        Self {
            legacy_id: row.text(&["customer_id", "cust_id", "customer_no", "id"]),
            name: PersonName::from_row(row),
            company_name: row.text(&["company_name", "company", "business_name"]),
            address: AddressFields::from_row(row),
            home_phone: row.text(&["home_phone", "phone"]),
            work_phone: row.text(&["work_phone", "business_phone"]),
            mobile_phone: row.text(&["mobile_phone", "cell_phone", "cell"]),
            fax: row.text(&["fax", "fax_phone"]),
            email: row.text(EMAIL),
            customer_type: row.text(&["customer_type", "cust_type", "type"]),
            pricing_plan: row.text(&["pricing_plan", "price_level", "price_plan"]),
            credit_limit: row.decimal(&["credit_limit"]),
            tax_exempt: row.flag(&["tax_exempt", "exempt"], false),
            tax_id: row.text(TAX_ID),
            allow_charge: row.flag(&["allow_charge", "charge_ok"], true),
            send_statements: row.flag(&["send_statements", "statements"], true),
            notes: row.text(&["notes", "comments"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorRecord {
    pub legacy_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub account_number: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub address: AddressFields,
    pub is_active: bool,
}

impl VendorRecord {
    pub fn from_row(row: &LegacyRow) -> Self {
        Self {
            legacy_id: row.text(&["vendor_id", "vend_id", "vendor_no", "id"]),
            name: row.text(&["vendor_name", "name", "company_name", "company"]),
            category: row.text(&["category", "vendor_category", "vendor_type"]),
            account_number: row.text(&["account_number", "account_no", "acct_no"]),
            tax_id: row.text(TAX_ID),
            phone: row.text(&["phone", "work_phone"]),
            fax: row.text(&["fax", "fax_phone"]),
            email: row.text(EMAIL),
            address: AddressFields::from_row(row),
            is_active: row.flag(&["is_active", "active"], true),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub legacy_id: Option<String>,
    pub name: PersonName,
    pub date_of_birth: Option<NaiveDate>,
    pub address: AddressFields,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub pay_rate: Option<f64>,
    pub pay_type: Option<String>,
    pub legacy_status: Option<String>,
    pub timeclock_enabled: bool,
}

impl EmployeeRecord {
    pub fn from_row(row: &LegacyRow) -> Self {
        Self {
            legacy_id: row.text(&["employee_id", "emp_id", "employee_no", "id"]),
            name: PersonName::from_row(row),
            date_of_birth: row.date(&["date_of_birth", "birth_date", "dob"]),
            address: AddressFields::from_row(row),
            home_phone: row.text(&["home_phone", "phone"]),
            mobile_phone: row.text(&["mobile_phone", "cell_phone", "cell"]),
            email: row.text(EMAIL),
            job_title: row.text(&["job_title", "title", "position"]),
            hire_date: row.date(&["hire_date", "date_hired"]),
            termination_date: row.date(&["termination_date", "term_date", "date_terminated"]),
            pay_rate: row.decimal(&["pay_rate", "hourly_rate", "rate"]),
            pay_type: row.text(&["pay_type"]),
            legacy_status: row.text(&["status", "employee_status"]),
            timeclock_enabled: row.flag(&["timeclock_enabled", "use_timeclock"], true),
        }
    }

    /// Status name: the legacy text lowercased, else derived from termination
    pub fn status(&self) -> String {
        match &self.legacy_status {
            Some(status) => status.to_lowercase(),
            None if self.termination_date.is_some() => "terminated".to_string(),
            None => "active".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubletCompanyRecord {
    pub company_name: Option<String>,
}

impl SubletCompanyRecord {
    pub fn from_row(row: &LegacyRow) -> Self {
        Self {
            company_name: row.text(&["company_name", "sublet_company", "vendor_name"]),
        }
    }
}

/// One legacy time-clock row, timestamps parsed but not yet anchored
#[derive(Debug, Clone, PartialEq)]
pub struct PunchRecord {
    pub employee_id: Option<String>,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub transaction_date: Option<NaiveDateTime>,
    pub transaction_type: Option<String>,
}

impl PunchRecord {
    pub fn from_row(row: &LegacyRow) -> Self {
        Self {
            employee_id: row.text(&["employee_id", "emp_id", "employee_no"]),
            clock_in: row.timestamp(&["clock_in", "time_in", "punch_in"]),
            clock_out: row.timestamp(&["clock_out", "time_out", "punch_out"]),
            transaction_date: row.timestamp(&["transaction_date", "trans_date", "work_date"]),
            transaction_type: row.text(&["transaction_type", "trans_type", "type_code"]),
        }
    }
}
