//! Legacy field values and their coercion rules
//!
//! Legacy columns are loosely typed: numbers stored as text, flags stored
//! as Y/N or -1/0, dates stored with zeroed components. Every coercion
//! happens here, at the ingestion boundary, so the engines only ever see
//! typed optional fields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Date carried by time-of-day-only legacy values (the OLE zero date)
///
/// Any timestamp before 1970 is anchored onto the transaction date by the
/// timeclock engine, so time-only values ride on this date until then.
pub fn legacy_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// One legacy field value, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LegacyValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for LegacyValue {
    fn from(value: &str) -> Self {
        LegacyValue::Text(value.to_string())
    }
}

impl From<String> for LegacyValue {
    fn from(value: String) -> Self {
        LegacyValue::Text(value)
    }
}

impl From<i64> for LegacyValue {
    fn from(value: i64) -> Self {
        LegacyValue::Integer(value)
    }
}

impl From<f64> for LegacyValue {
    fn from(value: f64) -> Self {
        LegacyValue::Real(value)
    }
}

impl<T: Into<LegacyValue>> From<Option<T>> for LegacyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LegacyValue::Null)
    }
}

impl LegacyValue {
    /// Trimmed, non-blank text rendering
    pub fn as_text(&self) -> Option<String> {
        match self {
            LegacyValue::Null => None,
            LegacyValue::Integer(i) => Some(i.to_string()),
            LegacyValue::Real(r) if r.fract() == 0.0 && r.abs() < 1e15 => {
                Some(format!("{}", *r as i64))
            }
            LegacyValue::Real(r) => Some(r.to_string()),
            LegacyValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    /// Numeric value; blank or non-numeric text is absent
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            LegacyValue::Null => None,
            LegacyValue::Integer(i) => Some(*i as f64),
            LegacyValue::Real(r) => r.is_finite().then_some(*r),
            LegacyValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .trim_start_matches('$')
                    .chars()
                    .filter(|c| *c != ',')
                    .collect();
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
    }

    /// Boolean-ish flag; unrecognized or absent values yield `default`
    pub fn as_flag(&self, default: bool) -> bool {
        match self {
            LegacyValue::Null => default,
            LegacyValue::Integer(0) => false,
            LegacyValue::Integer(_) => true,
            LegacyValue::Real(r) if *r == 0.0 => false,
            LegacyValue::Real(_) => true,
            LegacyValue::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
                "1" | "Y" | "YES" | "T" | "TRUE" | "-1" => true,
                "0" | "N" | "NO" | "F" | "FALSE" => false,
                _ => default,
            },
        }
    }

    /// Timestamp; zero dates, blanks and unparseable text are absent
    ///
    /// A zero date with a non-zero time, or a bare time, comes back on
    /// [`legacy_epoch`].
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            LegacyValue::Text(s) => parse_legacy_timestamp(s),
            _ => None,
        }
    }

    /// Calendar date; time-of-day-only values are absent
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_timestamp()
            .map(|ts| ts.date())
            .filter(|date| *date != legacy_epoch())
    }
}

const DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S%p",
    "%m/%d/%Y %I:%M%p",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: [&str; 6] = [
    "%H:%M:%S",
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M%p",
];

/// Parse a legacy timestamp string
pub fn parse_legacy_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(time_part) = strip_zero_date(s) {
        return parse_time(time_part).map(|time| legacy_epoch().and_time(time));
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return not_zero_epoch(ts);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return not_zero_epoch(date.and_time(NaiveTime::MIN));
        }
    }

    parse_time(s).map(|time| legacy_epoch().and_time(time))
}

/// Time part of a value whose date is all zeros, `""` when there is none
fn strip_zero_date(s: &str) -> Option<&str> {
    ["0000-00-00", "00/00/0000", "0/0/0000"]
        .iter()
        .find_map(|zero| s.strip_prefix(zero))
        .map(|rest| rest.trim_start_matches(['T', ' ']).trim())
}

/// Time of day; all-zero and unparseable times are absent
fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
        .filter(|time| *time != NaiveTime::MIN)
}

/// The legacy epoch at midnight is how the legacy system wrote "no date"
fn not_zero_epoch(ts: NaiveDateTime) -> Option<NaiveDateTime> {
    (ts != legacy_epoch().and_time(NaiveTime::MIN)).then_some(ts)
}
