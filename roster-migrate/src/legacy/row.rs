//! Ordered legacy row

use super::value::LegacyValue;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One legacy row: field names and values in source column order
///
/// Field lookup is case-insensitive, and every typed accessor takes a list
/// of candidate names so one view can read the spellings different legacy
/// installs used for the same column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyRow {
    fields: Vec<(String, LegacyValue)>,
}

impl LegacyRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<LegacyValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<LegacyValue>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// First value whose field name matches one of `names`
    pub fn get(&self, names: &[&str]) -> Option<&LegacyValue> {
        names.iter().find_map(|wanted| {
            self.fields
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value)
        })
    }

    /// First non-blank text among `names`
    pub fn text(&self, names: &[&str]) -> Option<String> {
        self.candidates(names).find_map(LegacyValue::as_text)
    }

    pub fn decimal(&self, names: &[&str]) -> Option<f64> {
        self.candidates(names).find_map(LegacyValue::as_decimal)
    }

    pub fn flag(&self, names: &[&str], default: bool) -> bool {
        match self.candidates(names).find(|v| v.as_text().is_some()) {
            Some(value) => value.as_flag(default),
            None => default,
        }
    }

    pub fn timestamp(&self, names: &[&str]) -> Option<NaiveDateTime> {
        self.candidates(names).find_map(LegacyValue::as_timestamp)
    }

    pub fn date(&self, names: &[&str]) -> Option<NaiveDate> {
        self.candidates(names).find_map(LegacyValue::as_date)
    }

    fn candidates<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a LegacyValue> + 'a {
        names.iter().filter_map(move |wanted| {
            self.fields
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value)
        })
    }
}

impl<K: Into<String>, V: Into<LegacyValue>> FromIterator<(K, V)> for LegacyRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
