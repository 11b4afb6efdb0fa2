//! Configuration for the mock prediction service.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Conditions served under `/predict/{condition}`.
    #[serde(default = "default_conditions")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub probability: ProbabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size. Matches the relay's default.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Simulated inference time, drawn uniformly from `[min_ms, max_ms]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "default_min_latency")]
    pub min_ms: u64,
    #[serde(default = "default_max_latency")]
    pub max_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            min_ms: default_min_latency(),
            max_ms: default_max_latency(),
        }
    }
}

/// Returned probability, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbabilityConfig {
    #[serde(default = "default_min_probability")]
    pub min: f64,
    #[serde(default = "default_max_probability")]
    pub max: f64,
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            min: default_min_probability(),
            max: default_max_probability(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
            conditions: default_conditions(),
            latency: LatencyConfig::default(),
            probability: ProbabilityConfig::default(),
        }
    }
}

// Default values
fn default_service_name() -> String {
    "Mock Prediction Service".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8001
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_conditions() -> Vec<String> {
    vec!["pneumonia".to_string()]
}
fn default_min_latency() -> u64 {
    500
}
fn default_max_latency() -> u64 {
    1500
}
fn default_min_probability() -> f64 {
    0.05
}
fn default_max_probability() -> f64 {
    0.95
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (MOCK__SECTION__KEY format)
    /// 2. The file named by MOCK_CONFIG, or mock.toml (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("MOCK_CONFIG").unwrap_or_else(|_| "mock".to_string());
        Self::load_from(&path, false)
    }

    /// Load configuration from a specific file, still honoring environment overrides.
    pub fn load_from(path: &str, required: bool) -> Result<Self, ConfigError> {
        let loaded = ConfigLoader::builder()
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix("MOCK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("conditions")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = loaded.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency.min_ms > self.latency.max_ms {
            return Err(ConfigError::Message(
                "latency.min_ms must not exceed latency.max_ms".to_string(),
            ));
        }

        let p = &self.probability;
        if !(0.0..=1.0).contains(&p.min) || !(0.0..=1.0).contains(&p.max) || p.min > p.max {
            return Err(ConfigError::Message(
                "probability bounds must satisfy 0 <= min <= max <= 1".to_string(),
            ));
        }

        if self.conditions.is_empty() {
            return Err(ConfigError::Message(
                "at least one condition must be configured".to_string(),
            ));
        }

        Ok(())
    }
}
