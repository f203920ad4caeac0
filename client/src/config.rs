//! Configuration management for the bean inspection client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with BEAN_ prefix

use std::time::Duration;

use chrono::{FixedOffset, Local, Offset};
use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Current environment (development, production)
    pub environment: String,

    /// Prediction service configuration
    pub prediction: PredictionConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Report list configuration
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionConfig {
    /// Base URL shared by both prediction endpoints
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Timeout applied to each store query, in seconds
    pub query_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportsConfig {
    /// Offset used to bucket reports into days; host local offset when absent
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by RUST_LOG
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl ClientConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment =
            std::env::var("BEAN_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("prediction.base_url", "http://localhost:5000")?
            .set_default("prediction.timeout_secs", 20)?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 1)?
            .set_default("store.query_timeout_secs", 15)?
            .set_default("logging.filter", "bean_inspection_client=debug")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BEAN_ prefix)
            .add_source(
                Environment::with_prefix("BEAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl PredictionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl ReportsConfig {
    /// Offset for day windows and report dates
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_offset() {
        let reports = ReportsConfig {
            utc_offset_minutes: Some(330),
        };
        assert_eq!(reports.offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_local() {
        let reports = ReportsConfig {
            utc_offset_minutes: Some(100_000),
        };
        assert_eq!(
            reports.offset().local_minus_utc(),
            Local::now().offset().fix().local_minus_utc()
        );
    }

    #[test]
    fn test_overflowing_offset_falls_back_to_local() {
        for minutes in [i32::MAX, i32::MIN, i32::MAX / 30] {
            let reports = ReportsConfig {
                utc_offset_minutes: Some(minutes),
            };
            assert_eq!(
                reports.offset().local_minus_utc(),
                Local::now().offset().fix().local_minus_utc()
            );
        }
    }

    #[test]
    fn test_timeouts_in_seconds() {
        let prediction = PredictionConfig {
            base_url: "http://localhost:5000".into(),
            timeout_secs: 20,
        };
        assert_eq!(prediction.timeout(), Duration::from_secs(20));
    }
}
