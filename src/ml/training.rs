//! ML Model Training Pipeline
//!
//! Chronological train/holdout split, ensemble fit, and fit-quality metrics.
//! The holdout error is informational; it never gates acceptance of a model.

use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::smartcore::SmartcoreRandomForest;
use super::ValidationMetrics;
use crate::error::{ForecastError, ForecastResult};

/// Training Dataset: rows in chronological order
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl TrainingDataset {
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> ForecastResult<Self> {
        if features.len() != targets.len() {
            return Err(ForecastError::Model(format!(
                "Feature and target count mismatch: {} features, {} targets",
                features.len(),
                targets.len()
            )));
        }
        Ok(Self { features, targets })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Split positionally: the first `1 - test_fraction` of rows train, the
    /// tail is held out. No shuffling.
    pub fn split(&self, test_fraction: f64) -> ForecastResult<(TrainingDataset, TrainingDataset)> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(ForecastError::Model(format!(
                "Test fraction must be in [0, 1), got {}",
                test_fraction
            )));
        }

        let split_idx = (self.len() as f64 * (1.0 - test_fraction)).floor() as usize;

        let train = TrainingDataset {
            features: self.features[..split_idx].to_vec(),
            targets: self.targets[..split_idx].to_vec(),
        };

        let holdout = TrainingDataset {
            features: self.features[split_idx..].to_vec(),
            targets: self.targets[split_idx..].to_vec(),
        };

        Ok((train, holdout))
    }
}

/// Training Configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(default)]
pub struct TrainingConfig {
    #[validate(range(min = 1, max = 2000))]
    pub n_trees: usize,
    pub max_depth: Option<u16>,
    #[validate(range(min = 2))]
    pub min_samples_split: usize,
    #[validate(range(min = 1))]
    pub min_samples_leaf: usize,
    /// Columns considered per split; all of them when unset.
    #[validate(range(min = 1))]
    pub max_features: Option<usize>,
    /// Fraction of the most recent rows held out for the MAE report.
    #[validate(range(min = 0.0, max = 0.9))]
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }
}

/// Model Trainer
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Calculate validation metrics
    pub fn calculate_metrics(
        &self,
        predictions: &[f64],
        targets: &[f64],
    ) -> ForecastResult<ValidationMetrics> {
        if predictions.len() != targets.len() {
            return Err(ForecastError::Model(
                "Prediction and target count mismatch".to_string(),
            ));
        }

        if predictions.is_empty() {
            return Err(ForecastError::Model("No predictions to evaluate".to_string()));
        }

        let n = predictions.len() as f64;

        // Mean Absolute Error
        let mae: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / n;

        // Root Mean Square Error
        let mse: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / n;
        let rmse = mse.sqrt();

        // Mean Absolute Percentage Error
        let mape: f64 = predictions
            .iter()
            .zip(targets.iter())
            .filter(|(_, t)| t.abs() > 1e-10) // Avoid division by zero
            .map(|(p, t)| ((p - t) / t).abs() * 100.0)
            .sum::<f64>()
            / n;

        // R-squared
        let mean_target: f64 = targets.iter().sum::<f64>() / n;
        let ss_tot: f64 = targets.iter().map(|t| (t - mean_target).powi(2)).sum();
        let ss_res: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (t - p).powi(2))
            .sum();

        let r2 = if ss_tot.abs() < 1e-10 {
            0.0
        } else {
            1.0 - (ss_res / ss_tot)
        };

        Ok(ValidationMetrics::new(mae, rmse, mape, r2, predictions.len()))
    }

    /// Fit a random forest on the head of `dataset` and score it on the tail.
    pub fn fit_random_forest(
        &self,
        dataset: &TrainingDataset,
        feature_names: Vec<String>,
        target: &str,
    ) -> ForecastResult<SmartcoreRandomForest> {
        let (train, holdout) = dataset.split(self.config.test_fraction)?;
        if train.is_empty() {
            return Err(ForecastError::data(format!(
                "No training rows for '{}' ({} rows before split)",
                target,
                dataset.len()
            )));
        }

        let mut model = SmartcoreRandomForest::train(
            &train.features,
            &train.targets,
            &self.config,
            feature_names,
            target,
        )?;

        if !holdout.is_empty() {
            let predictions = model.predict_rows(&holdout.features)?;
            let metrics = self.calculate_metrics(&predictions, &holdout.targets)?;
            info!(
                target,
                train_rows = train.len(),
                holdout_rows = holdout.len(),
                mae = metrics.mae,
                rmse = metrics.rmse,
                "holdout error"
            );
            model.metadata.holdout_metrics = Some(metrics);
        } else {
            info!(target, train_rows = train.len(), "trained without holdout");
        }

        Ok(model)
    }
}
