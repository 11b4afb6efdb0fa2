//! Configuration for the diagnosis gateway.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Main configuration structure for the gateway.
///
/// Built once in `main` and handed to the coordinator and router.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name reported by `GET /health`.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Prediction endpoints by name.
    #[serde(default = "default_endpoints")]
    pub endpoints: HashMap<String, EndpointConfig>,
    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size, image included.
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

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// "*" or a comma-separated list of allowed origins.
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

/// Settings for outbound calls to prediction endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Per-call timeout. No retries are attempted.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// A single prediction endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Full URL the image is POSTed to.
    pub url: String,
    /// Condition this endpoint scores. Defaults to the endpoint name.
    #[serde(default)]
    pub condition: Option<String>,
}

/// Which endpoints are called for which exam type.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Endpoints used for exam types without an explicit route.
    #[serde(default = "default_route")]
    pub default: Vec<String>,
    /// Exam type to ordered endpoint names.
    /// Example: { "raio_x_torax" = ["pneumonia", "tuberculosis"] }
    #[serde(default)]
    pub exams: HashMap<String, Vec<String>>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default: default_route(),
            exams: HashMap::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            upstream: UpstreamConfig::default(),
            endpoints: default_endpoints(),
            routing: RoutingConfig::default(),
        }
    }
}

// Default values
fn default_service_name() -> String {
    "Diagnox Backend".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cors_origins() -> String {
    "*".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_endpoints() -> HashMap<String, EndpointConfig> {
    HashMap::from([(
        "pneumonia".to_string(),
        EndpointConfig {
            url: "http://localhost:8001/predict/pneumonia".to_string(),
            condition: None,
        },
    )])
}
fn default_route() -> Vec<String> {
    vec!["pneumonia".to_string()]
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (DIAGNOX__SECTION__KEY format)
    /// 2. The file named by DIAGNOX_CONFIG, or config.toml (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("DIAGNOX_CONFIG").unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path, false)
    }

    /// Load configuration from a specific file, still honoring environment overrides.
    pub fn load_from(path: &str, required: bool) -> Result<Self, ConfigError> {
        let loaded = ConfigLoader::builder()
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix("DIAGNOX")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("routing.default")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = loaded.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject routes that name endpoints which do not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let routes = std::iter::once(("default", &self.routing.default)).chain(
            self.routing
                .exams
                .iter()
                .map(|(exam, route)| (exam.as_str(), route)),
        );

        for (exam, route) in routes {
            if let Some(unknown) = route.iter().find(|name| !self.endpoints.contains_key(*name)) {
                return Err(ConfigError::Message(format!(
                    "route '{}' references unknown endpoint '{}'",
                    exam, unknown
                )));
            }
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "upstream.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl EndpointConfig {
    /// Condition name, falling back to the endpoint's own name.
    pub fn condition_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.condition.as_deref().unwrap_or(name)
    }
}
