//! Diagnox Common Types
//!
//! Shared types used by both the diagnosis relay and the mock prediction service.

pub mod exam;
pub mod health;
pub mod prediction;

pub use exam::{requires_patient_sex, BONE_AGE_EXAM};
pub use health::HealthResponse;
pub use prediction::PredictionResult;
