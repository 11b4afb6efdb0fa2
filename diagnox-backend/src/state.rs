//! Shared application state.

use crate::config::Config;
use crate::coordinator::DiagnosisCoordinator;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub coordinator: DiagnosisCoordinator,
}

impl AppState {
    pub fn new(config: Config, coordinator: DiagnosisCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }
}
