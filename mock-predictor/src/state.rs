//! Shared application state.

use crate::config::Config;
use crate::sampler::PredictionSampler;

pub struct AppState {
    pub config: Config,
    pub sampler: PredictionSampler,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sampler = PredictionSampler::new(config.latency.clone(), config.probability.clone());
        Self { config, sampler }
    }
}
