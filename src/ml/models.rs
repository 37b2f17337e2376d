//! ML Model Definitions

use super::{FeatureVector, ModelMetadata, ModelType};
use crate::error::ForecastResult;

/// Trait for ML models
///
/// A fitted model is immutable; `predict` may be called concurrently.
pub trait MLModel: Send + Sync {
    /// Predict a value from features
    fn predict(&self, features: &FeatureVector) -> ForecastResult<f64>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

/// Model that always predicts the same value. Used as a baseline and in
/// rollout tests where the regressor output must be pinned.
#[derive(Debug, Clone)]
pub struct ConstantModel {
    pub metadata: ModelMetadata,
    pub value: f64,
}

impl ConstantModel {
    pub fn new(value: f64, feature_names: Vec<String>) -> Self {
        let metadata = ModelMetadata {
            model_id: "constant".to_string(),
            model_type: ModelType::Constant,
            target: "constant".to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: 0,
            holdout_metrics: None,
            feature_names,
        };
        Self { metadata, value }
    }
}

impl MLModel for ConstantModel {
    fn predict(&self, _features: &FeatureVector) -> ForecastResult<f64> {
        Ok(self.value)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
