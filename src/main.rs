//! repo-pulse
//!
//! GitHub repository mindshare tracker:
//! - Weekly created/pushed counts per tracked keyword, backfilled into a
//!   persisted table (missing cells only)
//! - Idempotent header migration when the keyword set changes
//! - Monthly top-N repository digest rendered as markdown

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use tracing::{info, warn};

use github_client::{GitHubClient, GitHubConfig};
use table_store::JsonFileStore;
use telemetry::init_tracing_from_env;
use worker::{BackfillConfig, BackfillEngine, DigestConfig, DigestWorker};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    /// Directory holding table files
    #[serde(default = "default_store_dir")]
    store_dir: String,

    /// Target table name
    #[serde(default = "default_table")]
    table: String,

    /// Fixed backfill start date (YYYY-MM-DD, should be a Sunday)
    #[serde(default = "default_anchor")]
    anchor: String,

    /// Tracked keywords, in column order
    #[serde(default)]
    keywords: Vec<String>,

    #[serde(default)]
    github: GitHubConfig,

    #[serde(default)]
    digest: DigestConfig,
}

fn default_store_dir() -> String {
    "./data".to_string()
}

fn default_table() -> String {
    "weekly-repos-created-pushed".to_string()
}

fn default_anchor() -> String {
    "2023-12-31".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            table: default_table(),
            anchor: default_anchor(),
            keywords: Vec::new(),
            github: GitHubConfig::default(),
            digest: DigestConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting repo-pulse v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    let anchor = NaiveDate::parse_from_str(&config.anchor, "%Y-%m-%d")
        .with_context(|| format!("Invalid anchor date: {}", config.anchor))?;
    if anchor.weekday() != Weekday::Sun {
        warn!(anchor = %anchor, "Anchor is not a Sunday; intervals start at the next Sunday");
    }

    let today = Utc::now().date_naive();
    let mode = std::env::args().nth(1).unwrap_or_else(|| "backfill".to_string());

    let client = Arc::new(
        GitHubClient::new(config.github.clone()).context("Failed to create GitHub client")?,
    );

    match mode.as_str() {
        "backfill" => {
            let store = Arc::new(JsonFileStore::new(&config.store_dir));
            let engine = BackfillEngine::new(
                client,
                store,
                BackfillConfig {
                    table: config.table.clone(),
                    anchor,
                    keywords: config.keywords.clone(),
                },
            )
            .context("Failed to create backfill engine")?;

            let summary = engine.run(today).await.context("Backfill failed")?;
            info!(
                cells_filled = summary.cells_filled,
                rows_appended = summary.rows_appended,
                calls_issued = summary.calls_issued,
                "Done"
            );
        }
        "digest" => {
            let digest = DigestWorker::new(client, config.digest.clone())
                .context("Failed to create digest worker")?;

            let summary = digest.run(anchor, today).await.context("Digest failed")?;
            info!(
                sections = summary.sections,
                calls_issued = summary.calls_issued,
                "Done"
            );
        }
        other => anyhow::bail!("Unknown mode: {} (expected 'backfill' or 'digest')", other),
    }

    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("PULSE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for list and nested values the env parser does not
    // handle reliably
    if let Ok(keywords) = std::env::var("PULSE_TRACKED_KEYWORDS") {
        config.keywords = keywords.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Ok(token) = std::env::var("PULSE_GITHUB_TOKEN") {
        config.github.token = Some(token);
    }
    if let Ok(query) = std::env::var("PULSE_DIGEST_QUERY") {
        config.digest.query = query;
    }

    Ok(config)
}
