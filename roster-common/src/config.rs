//! Configuration loading and resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_CONFIG: &str = "ROSTER_CONFIG";
pub const ENV_TARGET_DB: &str = "ROSTER_TARGET_DB";
pub const ENV_LEGACY_DB: &str = "ROSTER_LEGACY_DB";
pub const ENV_LEGACY_SCHEMA: &str = "ROSTER_LEGACY_SCHEMA";
pub const ENV_VENDOR_CATEGORIES: &str = "ROSTER_VENDOR_CATEGORIES";
pub const ENV_LOG_LEVEL: &str = "ROSTER_LOG_LEVEL";

pub const DEFAULT_LEGACY_SCHEMA: &str = "legacy";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub target_db: Option<PathBuf>,
    pub legacy_db: Option<PathBuf>,
    pub legacy_schema: Option<String>,
    pub vendor_categories_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub target_db: Option<PathBuf>,
    pub legacy_db: Option<PathBuf>,
    pub legacy_schema: Option<String>,
    pub vendor_categories_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration for one command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RosterConfig {
    /// Target SQLite database (main schema of every connection)
    pub target_db: PathBuf,
    /// Legacy SQLite database, attached read-side under `legacy_schema`
    pub legacy_db: Option<PathBuf>,
    /// Schema alias the legacy database is attached under
    pub legacy_schema: String,
    /// Optional vendor category description document
    pub vendor_categories_file: Option<PathBuf>,
    pub log_level: String,
}

impl RosterConfig {
    /// Resolve every setting from CLI overrides, environment and TOML
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let target_db = overrides
            .target_db
            .clone()
            .or_else(|| env_path(ENV_TARGET_DB))
            .or_else(|| toml_config.target_db.clone())
            .unwrap_or_else(default_target_db);

        let legacy_db = overrides
            .legacy_db
            .clone()
            .or_else(|| env_path(ENV_LEGACY_DB))
            .or_else(|| toml_config.legacy_db.clone());

        let legacy_schema = overrides
            .legacy_schema
            .clone()
            .or_else(|| env_string(ENV_LEGACY_SCHEMA))
            .or_else(|| toml_config.legacy_schema.clone())
            .unwrap_or_else(|| DEFAULT_LEGACY_SCHEMA.to_string());
        validate_schema_name(&legacy_schema)?;

        let vendor_categories_file = overrides
            .vendor_categories_file
            .clone()
            .or_else(|| env_path(ENV_VENDOR_CATEGORIES))
            .or_else(|| toml_config.vendor_categories_file.clone());

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| env_string(ENV_LOG_LEVEL))
            .or_else(|| toml_config.log_level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            target_db,
            legacy_db,
            legacy_schema,
            vendor_categories_file,
            log_level,
        })
    }

    /// Legacy database path, required by the migrate command
    pub fn require_legacy_db(&self) -> Result<&Path> {
        let path = self.legacy_db.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "Legacy database not configured. Use --legacy-db, {} or legacy_db in the TOML config",
                ENV_LEGACY_DB
            ))
        })?;

        if !path.exists() {
            return Err(Error::Config(format!(
                "Legacy database not found: {}",
                path.display()
            )));
        }
        Ok(path)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

/// Schema aliases are interpolated into ATTACH and SELECT statements,
/// so only plain identifiers are accepted.
pub fn validate_schema_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid && !name.eq_ignore_ascii_case("main") && !name.eq_ignore_ascii_case("temp") {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid legacy schema name: '{}'", name)))
    }
}

/// Config file location: explicit path, then ROSTER_CONFIG, then platform default
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path(ENV_CONFIG) {
        return Some(path);
    }
    dirs::config_dir().map(|d| d.join("roster").join("config.toml"))
}

/// Load the TOML config file
///
/// A missing or unreadable file never aborts: it logs a warning and yields
/// an empty config so the remaining tiers decide.
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        return TomlConfig::default();
    };

    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match read_toml_config(path) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Read and parse a TOML config file, reporting failures
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// OS-dependent default target database path
pub fn default_target_db() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("roster").join("roster.db"))
        .unwrap_or_else(|| PathBuf::from("./roster_data/roster.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_name_validation() {
        assert!(validate_schema_name("legacy").is_ok());
        assert!(validate_schema_name("_src2").is_ok());

        assert!(validate_schema_name("").is_err());
        assert!(validate_schema_name("2legacy").is_err());
        assert!(validate_schema_name("legacy; DROP TABLE x").is_err());
        assert!(validate_schema_name("main").is_err());
        assert!(validate_schema_name("TEMP").is_err());
    }

    #[test]
    fn test_toml_config_parses_partial_file() {
        let config: TomlConfig = toml::from_str(
            r#"
            legacy_db = "/srv/legacy/shop.db"
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.legacy_db, Some(PathBuf::from("/srv/legacy/shop.db")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.target_db.is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let config = load_toml_config(Some(Path::new("/nonexistent/roster/config.toml")));
        assert_eq!(config, TomlConfig::default());
    }
}
