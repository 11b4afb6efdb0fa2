//! Health check payload.

use serde::{Deserialize, Serialize};

/// Body of `GET /health` on every Diagnox service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    /// Healthy response for the named service.
    pub fn ok(service_name: &str) -> Self {
        Self {
            status: "ok".to_string(),
            message: format!("{} is running!", service_name),
        }
    }
}
