//! Random latency and probability sampling.

use std::time::Duration;

use rand::Rng;

use crate::config::{LatencyConfig, ProbabilityConfig};

/// Draws the simulated inference delay and the returned probability.
#[derive(Debug, Clone)]
pub struct PredictionSampler {
    latency: LatencyConfig,
    probability: ProbabilityConfig,
}

impl PredictionSampler {
    pub fn new(latency: LatencyConfig, probability: ProbabilityConfig) -> Self {
        Self {
            latency,
            probability,
        }
    }

    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.latency.min_ms..=self.latency.max_ms))
    }

    pub fn probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.probability.min..=self.probability.max)
    }
}
