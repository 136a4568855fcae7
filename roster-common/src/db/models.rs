//! Domain codes of the target model
//!
//! These codes are stored verbatim in the target tables and seeded by
//! the schema lifecycle, so their string forms must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a canonical entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Person,
    Organization,
}

impl EntityKind {
    pub fn code(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::Organization => "ORGANIZATION",
        }
    }
}

/// Organization subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgType {
    Business,
    Government,
    Financial,
    Other,
}

impl OrgType {
    pub const ALL: [OrgType; 4] = [
        OrgType::Business,
        OrgType::Government,
        OrgType::Financial,
        OrgType::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            OrgType::Business => "BUSINESS",
            OrgType::Government => "GOVERNMENT",
            OrgType::Financial => "FINANCIAL",
            OrgType::Other => "OTHER",
        }
    }
}

/// Role an entity can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCode {
    Customer,
    Vendor,
    Employee,
    SubletProvider,
}

impl RoleCode {
    pub const ALL: [RoleCode; 4] = [
        RoleCode::Customer,
        RoleCode::Vendor,
        RoleCode::Employee,
        RoleCode::SubletProvider,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RoleCode::Customer => "CUSTOMER",
            RoleCode::Vendor => "VENDOR",
            RoleCode::Employee => "EMPLOYEE",
            RoleCode::SubletProvider => "SUBLET_PROVIDER",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleCode::Customer => "Customer",
            RoleCode::Vendor => "Vendor",
            RoleCode::Employee => "Employee",
            RoleCode::SubletProvider => "Sublet provider",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Timeclock action recorded by a time event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeAction {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
    MealStart,
    MealEnd,
    Pto,
    Adjustment,
}

impl TimeAction {
    pub const ALL: [TimeAction; 8] = [
        TimeAction::ClockIn,
        TimeAction::ClockOut,
        TimeAction::BreakStart,
        TimeAction::BreakEnd,
        TimeAction::MealStart,
        TimeAction::MealEnd,
        TimeAction::Pto,
        TimeAction::Adjustment,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            TimeAction::ClockIn => "CLOCK_IN",
            TimeAction::ClockOut => "CLOCK_OUT",
            TimeAction::BreakStart => "BREAK_START",
            TimeAction::BreakEnd => "BREAK_END",
            TimeAction::MealStart => "MEAL_START",
            TimeAction::MealEnd => "MEAL_END",
            TimeAction::Pto => "PTO",
            TimeAction::Adjustment => "ADJUSTMENT",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TimeAction::ClockIn => "Clock in",
            TimeAction::ClockOut => "Clock out",
            TimeAction::BreakStart => "Break start",
            TimeAction::BreakEnd => "Break end",
            TimeAction::MealStart => "Meal start",
            TimeAction::MealEnd => "Meal end",
            TimeAction::Pto => "Paid time off",
            TimeAction::Adjustment => "Adjustment",
        }
    }

    /// The start counterpart of an end action; other actions are unchanged
    pub fn as_start(self) -> TimeAction {
        match self {
            TimeAction::ClockOut => TimeAction::ClockIn,
            TimeAction::BreakEnd => TimeAction::BreakStart,
            TimeAction::MealEnd => TimeAction::MealStart,
            other => other,
        }
    }

    /// The action closing a span opened by this action
    pub fn paired_end(self) -> TimeAction {
        match self {
            TimeAction::BreakStart => TimeAction::BreakEnd,
            TimeAction::MealStart => TimeAction::MealEnd,
            TimeAction::Pto => TimeAction::Pto,
            _ => TimeAction::ClockOut,
        }
    }
}

impl fmt::Display for TimeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How a time event was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Terminal,
    Admin,
    Mobile,
    Imported,
}

impl EntryType {
    pub const ALL: [EntryType; 4] = [
        EntryType::Terminal,
        EntryType::Admin,
        EntryType::Mobile,
        EntryType::Imported,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            EntryType::Terminal => "TERMINAL",
            EntryType::Admin => "ADMIN",
            EntryType::Mobile => "MOBILE",
            EntryType::Imported => "IMPORTED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EntryType::Terminal => "Timeclock terminal",
            EntryType::Admin => "Entered by administrator",
            EntryType::Mobile => "Mobile device",
            EntryType::Imported => "Imported from legacy system",
        }
    }
}

/// Small reference tables resolved by name or code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupTable {
    PhoneTypes,
    EmailTypes,
    AddressTypes,
    CustomerTypes,
    PricingPlans,
    EmployeeStatuses,
    VendorCategories,
    TimeclockActionTypes,
    TimeclockEntryTypes,
}

impl LookupTable {
    pub const ALL: [LookupTable; 9] = [
        LookupTable::PhoneTypes,
        LookupTable::EmailTypes,
        LookupTable::AddressTypes,
        LookupTable::CustomerTypes,
        LookupTable::PricingPlans,
        LookupTable::EmployeeStatuses,
        LookupTable::VendorCategories,
        LookupTable::TimeclockActionTypes,
        LookupTable::TimeclockEntryTypes,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            LookupTable::PhoneTypes => "phone_types",
            LookupTable::EmailTypes => "email_types",
            LookupTable::AddressTypes => "address_types",
            LookupTable::CustomerTypes => "customer_types",
            LookupTable::PricingPlans => "pricing_plans",
            LookupTable::EmployeeStatuses => "employee_statuses",
            LookupTable::VendorCategories => "vendor_categories",
            LookupTable::TimeclockActionTypes => "timeclock_action_types",
            LookupTable::TimeclockEntryTypes => "timeclock_entry_types",
        }
    }

    /// Unique column the table is resolved by
    pub fn key_column(&self) -> &'static str {
        match self {
            LookupTable::VendorCategories
            | LookupTable::TimeclockActionTypes
            | LookupTable::TimeclockEntryTypes => "code",
            _ => "name",
        }
    }
}

/// Seeded contact type names (lookup tables also grow on first use)
pub const PHONE_TYPES: [&str; 4] = ["home", "work", "mobile", "fax"];
pub const EMAIL_TYPES: [&str; 2] = ["personal", "work"];
pub const ADDRESS_TYPES: [&str; 3] = ["mailing", "billing", "home"];
pub const EMPLOYEE_STATUSES: [&str; 3] = ["active", "inactive", "terminated"];
