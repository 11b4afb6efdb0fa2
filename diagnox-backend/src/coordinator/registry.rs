//! Endpoint registry and exam routing table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::{HttpPredictionEndpoint, PredictionEndpoint};
use crate::config::Config;
use crate::error::{Error, Result};

/// Registry of prediction endpoints and the routes that select them.
///
/// Built once at startup and read-only afterwards.
pub struct EndpointRegistry {
    endpoints: HashMap<String, Arc<dyn PredictionEndpoint>>,
    routes: HashMap<String, Vec<String>>,
    default_route: Vec<String>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: HashMap::new(),
            routes: HashMap::new(),
            default_route: Vec::new(),
        }
    }

    /// Build HTTP endpoints and routes from configuration.
    ///
    /// All endpoints share one connection pool with the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.upstream.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        let mut registry = Self::new();
        for (name, endpoint) in &config.endpoints {
            let endpoint = Arc::new(HttpPredictionEndpoint::new(
                http_client.clone(),
                name,
                &endpoint.url,
                endpoint.condition_or(name),
            ));
            tracing::info!(
                "Registered prediction endpoint {} ({}) at {}",
                name,
                endpoint.condition(),
                endpoint.url()
            );
            registry.register(endpoint);
        }

        registry.set_default_route(config.routing.default.iter().cloned());
        for (exam_type, route) in &config.routing.exams {
            registry.set_route(exam_type, route.iter().cloned());
        }

        Ok(registry)
    }

    /// Register an endpoint under its own name, replacing any previous one.
    pub fn register(&mut self, endpoint: Arc<dyn PredictionEndpoint>) {
        self.endpoints.insert(endpoint.name().to_string(), endpoint);
    }

    /// Set the ordered endpoint names called for an exam type.
    pub fn set_route<I, S>(&mut self, exam_type: &str, endpoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes.insert(
            exam_type.to_string(),
            endpoints.into_iter().map(Into::into).collect(),
        );
    }

    /// Set the route used by exam types without their own.
    pub fn set_default_route<I, S>(&mut self, endpoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_route = endpoints.into_iter().map(Into::into).collect();
    }

    /// Get an endpoint by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn PredictionEndpoint>> {
        self.endpoints.get(name).cloned()
    }

    /// Endpoints for an exam type, in route order.
    ///
    /// Names without a registered endpoint are skipped.
    pub fn route(&self, exam_type: &str) -> Vec<Arc<dyn PredictionEndpoint>> {
        self.routes
            .get(exam_type)
            .unwrap_or(&self.default_route)
            .iter()
            .filter_map(|name| {
                let endpoint = self.get(name);
                if endpoint.is_none() {
                    tracing::warn!("Route for {} names unknown endpoint {}", exam_type, name);
                }
                endpoint
            })
            .collect()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
