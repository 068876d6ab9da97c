//! Configuration module
//!
//! Configuration is read once at startup from a TOML file
//! (`~/.config/sweetspot/config.toml` by default) and handed to every
//! component that needs it. Every field has a default, so a partial file
//! (or no file at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::GridParameters;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SWEETSPOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default config location: `~/.config/sweetspot/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sweetspot")
        .join("config.toml")
}

/// Config path from `SWEETSPOT_CONFIG`, falling back to [`default_config_path`].
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub routing: RoutingConfig,
    pub search: SearchConfig,
    pub grid: GridParameters,
    pub data: DataConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        if !(search.final_radius_km > 0.0 && search.final_radius_km.is_finite()) {
            return Err(ConfigError::Invalid(
                "search.final_radius_km must be a positive number".into(),
            ));
        }
        if !(search.prefilter_radius_km >= search.final_radius_km) {
            return Err(ConfigError::Invalid(format!(
                "search.prefilter_radius_km ({}) must not be smaller than search.final_radius_km ({})",
                search.prefilter_radius_km, search.final_radius_km
            )));
        }
        if search.worker_cap == 0 {
            return Err(ConfigError::Invalid(
                "search.worker_cap must be at least 1".into(),
            ));
        }
        if self.routing.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "routing.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Routing service (OneMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    /// Initial access token. Refreshing it is the job of an external collaborator.
    pub access_token: String,
    pub route_type: String,
    /// Per-call deadline in seconds
    pub timeout_secs: u64,
    /// Idle keep-alive connections kept by each worker's client
    pub pool_idle_per_worker: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.onemap.gov.sg".to_string(),
            access_token: String::new(),
            route_type: "drive".to_string(),
            timeout_secs: 2,
            pool_idle_per_worker: 4,
        }
    }
}

/// Nearby search tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Car parks farther than this from the searched location are never returned
    pub final_radius_km: f64,
    /// Looser radius used to shrink the car park snapshot before enrichment
    pub prefilter_radius_km: f64,
    /// Maximum concurrent routing calls per batch
    pub worker_cap: usize,
    /// Answer 500 instead of a degraded 200 when exactly one batch fails
    pub fail_on_partial: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            final_radius_km: 2.0,
            prefilter_radius_km: 2.5,
            worker_cap: 10,
            fail_on_partial: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON array of car park feed records ingested at startup
    pub car_parks_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.api_port, 8080);
        assert_eq!(cfg.search.worker_cap, 10);
        assert_eq!(cfg.search.final_radius_km, 2.0);
        assert_eq!(cfg.search.prefilter_radius_km, 2.5);
        assert_eq!(cfg.grid, GridParameters::SVY21);
        assert!(cfg.data.car_parks_file.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9090

            [routing]
            access_token = "secret"

            [search]
            worker_cap = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 9090);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.routing.access_token, "secret");
        assert_eq!(cfg.routing.timeout_secs, 2);
        assert_eq!(cfg.search.worker_cap, 4);
        assert_eq!(cfg.api_address(), "0.0.0.0:9090");
    }

    #[test]
    fn prefilter_radius_smaller_than_final_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [search]
            final_radius_km = 3.0
            prefilter_radius_km = 2.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_numeric_radii_are_rejected() {
        for raw in [
            "[search]\nfinal_radius_km = nan\nprefilter_radius_km = nan\n",
            "[search]\nfinal_radius_km = 2.0\nprefilter_radius_km = nan\n",
            "[search]\nfinal_radius_km = inf\nprefilter_radius_km = inf\n",
        ] {
            let err = AppConfig::from_toml(raw).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{raw}");
        }
    }

    #[test]
    fn zero_worker_cap_is_rejected() {
        let err = AppConfig::from_toml("[search]\nworker_cap = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("[server\napi_port = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
