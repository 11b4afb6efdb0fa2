//! Prediction results returned by model endpoints.

use serde::{Deserialize, Serialize};

/// A single condition prediction.
///
/// This is both the body a prediction endpoint returns and an entry in the
/// relay's aggregated `results` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Condition the model scored (e.g., "pneumonia")
    pub condition_name: String,
    /// Probability in `[0, 1]`
    pub probability: f64,
}

impl PredictionResult {
    pub fn new(condition_name: impl Into<String>, probability: f64) -> Self {
        Self {
            condition_name: condition_name.into(),
            probability,
        }
    }

    /// True when the probability is finite and within `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        self.probability.is_finite() && (0.0..=1.0).contains(&self.probability)
    }
}
