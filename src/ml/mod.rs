//! Machine Learning Module
//!
//! Point-estimate regressors behind the forecast variants:
//! - [`models::MLModel`] is the seam the rollout predicts through
//! - [`smartcore::SmartcoreRandomForest`] is the production regressor
//! - [`training`] holds the chronological split and fit-quality metrics

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

pub mod models;
pub mod smartcore;
pub mod training;

pub use models::MLModel;
pub use training::{ModelTrainer, TrainingConfig, TrainingDataset};

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelType {
    RandomForest,
    Constant,
}

/// ML Model Metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub target: String,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub training_samples: usize,
    /// Metrics on the chronologically held-out tail, if one was kept.
    pub holdout_metrics: Option<ValidationMetrics>,
    pub feature_names: Vec<String>,
}

/// Validation Metrics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    pub mae: f64,  // Mean Absolute Error
    pub rmse: f64, // Root Mean Square Error
    pub mape: f64, // Mean Absolute Percentage Error
    pub r2: f64,   // R-squared
    pub samples: usize,
}

impl ValidationMetrics {
    pub fn new(mae: f64, rmse: f64, mape: f64, r2: f64, samples: usize) -> Self {
        Self {
            mae,
            rmse,
            mape,
            r2,
            samples,
        }
    }
}

/// Feature Vector for ML models
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub feature_names: Arc<[String]>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, feature_names: Arc<[String]>) -> ForecastResult<Self> {
        if features.len() != feature_names.len() {
            return Err(ForecastError::Model(format!(
                "Feature count mismatch: {} features, {} names",
                features.len(),
                feature_names.len()
            )));
        }
        Ok(Self {
            features,
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.features[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Arc<[String]> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_feature_vector_creation() {
        let fv = FeatureVector::new(vec![1.0, 2.0, 3.0], names(&["f1", "f2", "f3"])).unwrap();
        assert_eq!(fv.len(), 3);
        assert!(!fv.is_empty());
        assert_eq!(fv.get("f2"), Some(2.0));
        assert_eq!(fv.get("missing"), None);
    }

    #[test]
    fn test_feature_vector_length_mismatch() {
        let err = FeatureVector::new(vec![1.0], names(&["f1", "f2"])).unwrap_err();
        assert!(matches!(err, ForecastError::Model(_)));
    }
}
