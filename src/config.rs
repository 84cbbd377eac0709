//! Configuration loader for the `courseplanner-offerings` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::aggregator::AggregatorSettings;
use crate::models::AboutInfo;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string (catalog and grade statistics).
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// CourSys browse endpoint for live enrollment.
    pub coursys_url: String,

    /// Maximum concurrent CourSys requests per query.
    pub coursys_concurrency: u32,

    /// Deadline for each upstream call, in seconds.
    pub upstream_timeout_secs: u32,

    /// Course outline page used to build outline links.
    pub outline_base_url: String,

    pub app_name: String,
    pub app_author: String,

    /// HTTP listen port.
    pub listen_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `COURSYS_URL` – CourSys browse endpoint (default: `https://coursys.sfu.ca/browse/`)
/// - `COURSYS_CONCURRENCY` – concurrent CourSys requests (default: 4)
/// - `UPSTREAM_TIMEOUT_SECS` – per-call upstream deadline (default: 10)
/// - `OUTLINE_BASE_URL` – outline page (default: `https://www.sfu.ca/outlines.html`)
/// - `APP_NAME` / `APP_AUTHOR` – values reported by `/api/about`
/// - `LISTEN_PORT` – HTTP port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let coursys_url = env_or!("COURSYS_URL", "https://coursys.sfu.ca/browse/");
    let coursys_concurrency = parse_env_u32!("COURSYS_CONCURRENCY", 4);
    let upstream_timeout_secs = parse_env_u32!("UPSTREAM_TIMEOUT_SECS", 10);
    let outline_base_url = env_or!("OUTLINE_BASE_URL", "https://www.sfu.ca/outlines.html");
    let app_name = env_or!("APP_NAME", "CoursePlanner");
    let app_author = env_or!("APP_AUTHOR", "Anonymous");
    let listen_port = u16::try_from(parse_env_u32!("LISTEN_PORT", 8080))
        .map_err(|e| anyhow!("Invalid LISTEN_PORT: {}", e))?;

    if upstream_timeout_secs == 0 {
        return Err(anyhow!("UPSTREAM_TIMEOUT_SECS must be positive"));
    }

    Ok(Config {
        db_url,
        db_pool_max,
        coursys_url,
        coursys_concurrency,
        upstream_timeout_secs,
        outline_base_url,
        app_name,
        app_author,
        listen_port,
    })
}

impl Config {
    // ---
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.upstream_timeout_secs))
    }

    /// Settings handed to the offering aggregator.
    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            about: AboutInfo {
                app_name: self.app_name.clone(),
                author_name: self.app_author.clone(),
            },
            outline_base_url: self.outline_base_url.clone(),
            upstream_timeout: self.upstream_timeout(),
        }
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                return format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                );
            }
        }
        self.db_url.clone()
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL          : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX           : {}", self.db_pool_max);
        tracing::info!("  COURSYS_URL           : {}", self.coursys_url);
        tracing::info!("  COURSYS_CONCURRENCY   : {}", self.coursys_concurrency);
        tracing::info!("  UPSTREAM_TIMEOUT_SECS : {}", self.upstream_timeout_secs);
        tracing::info!("  OUTLINE_BASE_URL      : {}", self.outline_base_url);
        tracing::info!("  APP_NAME              : {}", self.app_name);
        tracing::info!("  APP_AUTHOR            : {}", self.app_author);
        tracing::info!("  LISTEN_PORT           : {}", self.listen_port);
    }
}
