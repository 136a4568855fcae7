//! Vendor category classifier
//!
//! Maps free-text legacy vendor categories onto a fixed set of canonical
//! codes through a synonym table. Descriptions come from an optional
//! reference document (JSON object or TOML table of code to description);
//! a missing or unreadable document only costs the nicer descriptions.

use crate::normalize::{normalize_code, title_case_code};
use roster_common::db::OrgType;
use roster_common::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

pub const UNCLASSIFIED: &str = "UNCLASSIFIED";

/// Canonical code and its synonyms, in normalized form
///
/// Every canonical code also matches its own normalized spelling.
pub const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    ("PARTS", &["PARTS", "AUTO PARTS", "PART", "PARTS SUPPLIER", "PARTS VENDOR"]),
    (
        "OFFICE_SHOP_SUPPLIES",
        &["OFFICE SHOP SUPPLIES", "OFFICE SUPPLIES", "SHOP SUPPLIES", "SUPPLIES"],
    ),
    ("TIRES", &["TIRES", "TIRE", "TYRES"]),
    ("SUBLET", &["SUBLET", "SUBLET REPAIR", "OUTSIDE SERVICES", "OUTSIDE LABOR"]),
    ("UTILITIES", &["UTILITIES", "UTILITY", "ELECTRIC", "GAS", "WATER", "PHONE", "INTERNET"]),
    ("RENT_LEASE", &["RENT", "LEASE", "RENT LEASE", "RENT AND LEASE"]),
    ("INSURANCE", &["INSURANCE", "INS"]),
    ("BANKING", &["BANK", "BANKING", "BANK FEES", "LOAN", "LOANS"]),
    ("CREDIT_CARDS", &["CREDIT CARD", "CREDIT CARDS", "CC", "MERCHANT SERVICES"]),
    (
        "TAXES_GOVERNMENT",
        &["TAX", "TAXES", "GOVERNMENT", "TAXES GOVERNMENT", "IRS", "STATE TAX", "DMV", "LICENSES"],
    ),
    (
        "PROFESSIONAL_SERVICES",
        &["PROFESSIONAL", "PROFESSIONAL SERVICES", "ACCOUNTING", "LEGAL", "CONSULTING"],
    ),
    ("ADVERTISING", &["ADVERTISING", "ADVERTISEMENT", "MARKETING", "ADS"]),
    ("EQUIPMENT_TOOLS", &["EQUIPMENT", "TOOLS", "EQUIPMENT TOOLS", "TOOL"]),
    ("FLUIDS_LUBRICANTS", &["FLUIDS", "LUBRICANTS", "OIL", "FLUIDS LUBRICANTS", "LUBE"]),
    ("TOWING", &["TOWING", "TOW", "WRECKER"]),
];

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorCategory {
    pub code: &'static str,
    pub description: String,
}

impl VendorCategory {
    /// Organization subtype implied by the category
    pub fn org_type(&self) -> OrgType {
        org_type_for_category(self.code)
    }
}

/// Banking and credit card vendors are financial institutions, taxes and
/// government vendors are agencies, the rest are businesses
pub fn org_type_for_category(code: &str) -> OrgType {
    match code {
        "BANKING" | "CREDIT_CARDS" => OrgType::Financial,
        "TAXES_GOVERNMENT" => OrgType::Government,
        _ => OrgType::Business,
    }
}

#[derive(Debug, Clone, Default)]
pub struct VendorClassifier {
    synonyms: HashMap<String, &'static str>,
    descriptions: HashMap<String, String>,
}

impl VendorClassifier {
    pub fn new() -> Self {
        let mut synonyms = HashMap::new();
        for (code, words) in CATEGORY_SYNONYMS {
            // First match wins
            synonyms.entry(normalize_code(code)).or_insert(*code);
            for word in *words {
                synonyms.entry(normalize_code(word)).or_insert(*code);
            }
        }
        Self {
            synonyms,
            descriptions: HashMap::new(),
        }
    }

    /// Classifier with descriptions from `path`, degrading to derived ones
    pub fn with_reference_file(path: Option<&Path>) -> Self {
        let mut classifier = Self::new();
        let Some(path) = path else {
            return classifier;
        };

        match load_reference_descriptions(path) {
            Ok(descriptions) => {
                info!(
                    "Loaded {} vendor category descriptions from {}",
                    descriptions.len(),
                    path.display()
                );
                classifier.descriptions = descriptions;
            }
            Err(e) => {
                warn!(
                    "Vendor category reference {} unavailable ({}); using derived descriptions",
                    path.display(),
                    e
                );
            }
        }
        classifier
    }

    pub fn with_descriptions(mut self, descriptions: HashMap<String, String>) -> Self {
        self.descriptions = descriptions;
        self
    }

    /// Classify a legacy category; blank or unknown text is UNCLASSIFIED
    pub fn classify(&self, legacy_code: Option<&str>) -> VendorCategory {
        let normalized = normalize_code(legacy_code.unwrap_or_default());
        let code = self
            .synonyms
            .get(&normalized)
            .copied()
            .unwrap_or(UNCLASSIFIED);

        VendorCategory {
            code,
            description: self.describe(code),
        }
    }

    pub fn describe(&self, code: &str) -> String {
        self.descriptions
            .get(code)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| title_case_code(code))
    }
}

/// Parse a code-to-description document, JSON or TOML by extension
pub fn load_reference_descriptions(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let raw: HashMap<String, String> = if is_toml {
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse JSON failed: {}", e)))?
    };

    Ok(raw
        .into_iter()
        .map(|(code, description)| (code.trim().to_uppercase(), description))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_synonym_table_has_no_conflicts() {
        let mut owner: HashMap<String, &str> = HashMap::new();
        for (code, words) in CATEGORY_SYNONYMS {
            for word in std::iter::once(code).chain(words.iter()) {
                let key = normalize_code(word);
                if let Some(previous) = owner.insert(key.clone(), *code) {
                    assert_eq!(previous, *code, "'{}' claimed by {} and {}", key, previous, code);
                }
            }
        }
    }

    #[test]
    fn test_spelling_variants_classify_identically() {
        let classifier = VendorClassifier::new();
        for raw in ["OFFICE-SHOP SUPPLIES", "office/shop supplies", "OFFICE  SHOP-SUPPLIES"] {
            assert_eq!(classifier.classify(Some(raw)).code, "OFFICE_SHOP_SUPPLIES", "{}", raw);
        }
        assert_eq!(classifier.classify(Some("office_shop_supplies")).code, "OFFICE_SHOP_SUPPLIES");
        assert_eq!(classifier.classify(Some("'Tires'")).code, "TIRES");
    }

    #[test]
    fn test_unknown_and_blank_are_unclassified() {
        let classifier = VendorClassifier::new();

        let unknown = classifier.classify(Some("Miscellaneous stuff"));
        assert_eq!(unknown.code, UNCLASSIFIED);
        assert_eq!(unknown.description, "Unclassified");

        assert_eq!(classifier.classify(None).code, UNCLASSIFIED);
        assert_eq!(classifier.classify(Some("  ")).code, UNCLASSIFIED);
    }

    #[test]
    fn test_org_type_heuristic() {
        let classifier = VendorClassifier::new();
        assert_eq!(classifier.classify(Some("Bank")).org_type(), OrgType::Financial);
        assert_eq!(classifier.classify(Some("credit cards")).org_type(), OrgType::Financial);
        assert_eq!(classifier.classify(Some("IRS")).org_type(), OrgType::Government);
        assert_eq!(classifier.classify(Some("parts")).org_type(), OrgType::Business);
        assert_eq!(classifier.classify(Some("???")).org_type(), OrgType::Business);
    }

    #[test]
    fn test_reference_descriptions_from_json_and_toml() {
        let temp_dir = TempDir::new().unwrap();

        let json_path = temp_dir.path().join("categories.json");
        std::fs::write(&json_path, r#"{"TIRES": "Tires and wheels", "parts": "Replacement parts"}"#)
            .unwrap();
        let classifier = VendorClassifier::with_reference_file(Some(&json_path));
        assert_eq!(classifier.classify(Some("tire")).description, "Tires and wheels");
        assert_eq!(classifier.classify(Some("parts")).description, "Replacement parts");
        assert_eq!(classifier.classify(Some("towing")).description, "Towing");

        let toml_path = temp_dir.path().join("categories.toml");
        std::fs::write(&toml_path, "RENT_LEASE = \"Shop rent\"\n").unwrap();
        let classifier = VendorClassifier::with_reference_file(Some(&toml_path));
        assert_eq!(classifier.classify(Some("lease")).description, "Shop rent");
    }

    #[test]
    fn test_unreadable_reference_degrades() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("categories.json");
        std::fs::write(&broken, "{ not json").unwrap();

        for path in [broken, temp_dir.path().join("absent.json")] {
            let classifier = VendorClassifier::with_reference_file(Some(&path));
            let category = classifier.classify(Some("OFFICE SUPPLIES"));
            assert_eq!(category.code, "OFFICE_SHOP_SUPPLIES");
            assert_eq!(category.description, "Office Shop Supplies");
        }
    }
}
