//! roster - legacy party migration tool
//!
//! Commands:
//! - `create`: target schema plus seeded reference data
//! - `drop`: every target table
//! - `update`: additive schema update (columns, migrations, reseed)
//! - `migrate [--dry-run]`: legacy customers, vendors, employees, timeclock
//!   punches and sublet providers into the entities + roles model
//!
//! Settings resolve CLI → environment → TOML config → default.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster_common::config::{config_file_path, load_toml_config, ConfigOverrides, RosterConfig};
use roster_common::db::{create_schema, drop_schema, open_target_pool, update_schema, LegacyAttachment};
use roster_migrate::legacy::SqliteLegacySource;
use roster_migrate::services::VendorClassifier;
use roster_migrate::{MigrationOrchestrator, RunMode};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{reload, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for roster
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Migrates legacy party records into the entities + roles model")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Target SQLite database
    #[arg(long, global = true, env = "ROSTER_TARGET_DB")]
    target_db: Option<PathBuf>,

    /// Legacy SQLite database (required by migrate)
    #[arg(long, global = true, env = "ROSTER_LEGACY_DB")]
    legacy_db: Option<PathBuf>,

    /// Schema alias the legacy database is attached under
    #[arg(long, global = true, env = "ROSTER_LEGACY_SCHEMA")]
    legacy_schema: Option<String>,

    /// Vendor category descriptions (JSON or TOML)
    #[arg(long, global = true, env = "ROSTER_VENDOR_CATEGORIES")]
    vendor_categories: Option<PathBuf>,

    /// Log filter, e.g. "info" or "roster_migrate=debug"
    #[arg(long, global = true, env = "ROSTER_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the target schema and seed reference data
    Create,
    /// Drop every target table
    Drop,
    /// Bring an existing target schema up to date
    Update,
    /// Migrate legacy records into the target
    Migrate {
        /// Make every decision and report statistics without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the filter is swapped for the configured level below
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting roster v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = load_toml_config(config_file_path(cli.config.as_deref()).as_deref());
    let overrides = ConfigOverrides {
        target_db: cli.target_db,
        legacy_db: cli.legacy_db,
        legacy_schema: cli.legacy_schema,
        vendor_categories_file: cli.vendor_categories,
        log_level: cli.log_level,
    };
    let config = RosterConfig::resolve(&overrides, &toml_config)?;

    if !from_env {
        let level = EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("Invalid log level '{}'", config.log_level))?;
        filter_handle.reload(level)?;
    }

    info!("Target database: {}", config.target_db.display());

    match cli.command {
        Command::Create => {
            let pool = open_target_pool(&config.target_db, None).await?;
            let report = create_schema(&pool).await?;
            info!("Create complete: {}", report.display_string());
            pool.close().await;
        }
        Command::Drop => {
            let pool = open_target_pool(&config.target_db, None).await?;
            let dropped = drop_schema(&pool).await?;
            info!("Drop complete: {} tables dropped", dropped);
            pool.close().await;
        }
        Command::Update => {
            let pool = open_target_pool(&config.target_db, None).await?;
            let report = update_schema(&pool).await?;
            info!("Update complete: {}", report.display_string());
            pool.close().await;
        }
        Command::Migrate { dry_run } => migrate(&config, dry_run).await?,
    }

    Ok(())
}

async fn migrate(config: &RosterConfig, dry_run: bool) -> Result<()> {
    let legacy_db = config.require_legacy_db()?;
    let attachment = LegacyAttachment::new(legacy_db, config.legacy_schema.as_str());
    let pool = open_target_pool(&config.target_db, Some(&attachment))
        .await
        .context("Failed to open target database")?;

    let source = SqliteLegacySource::new(pool.clone(), config.legacy_schema.as_str())?;
    let classifier = VendorClassifier::with_reference_file(config.vendor_categories_file.as_deref());

    let report = MigrationOrchestrator::new(pool.clone(), Box::new(source), RunMode::from_dry_run(dry_run))
        .with_classifier(classifier)
        .run()
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    pool.close().await;
    Ok(())
}
