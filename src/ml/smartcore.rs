//! SmartCore ML Model Wrapper
//!
//! Wraps SmartCore's RandomForestRegressor behind [`MLModel`].

use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::models::MLModel;
use super::training::TrainingConfig;
use super::{FeatureVector, ModelMetadata, ModelType};
use crate::error::{ForecastError, ForecastResult};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// SmartCore RandomForest Model Wrapper
pub struct SmartcoreRandomForest {
    pub metadata: ModelMetadata,
    model: Forest,
    /// Training parameters for reproducibility
    pub n_trees: usize,
    pub max_depth: Option<u16>,
}

impl std::fmt::Debug for SmartcoreRandomForest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartcoreRandomForest")
            .field("metadata", &self.metadata)
            .field("n_trees", &self.n_trees)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl SmartcoreRandomForest {
    /// Forest parameters from a training configuration. Every split considers
    /// all `n_features` columns unless `max_features` narrows it.
    pub fn parameters(
        config: &TrainingConfig,
        n_features: usize,
    ) -> RandomForestRegressorParameters {
        let m = config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));
        RandomForestRegressorParameters {
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
            min_samples_split: config.min_samples_split,
            n_trees: config.n_trees,
            m: Some(m),
            keep_samples: false,
            seed: config.seed,
        }
    }

    /// Train a new RandomForest model
    pub fn train(
        x: &[Vec<f64>],
        y: &[f64],
        config: &TrainingConfig,
        feature_names: Vec<String>,
        target: &str,
    ) -> ForecastResult<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(ForecastError::data("Cannot train on empty dataset"));
        }

        if x.len() != y.len() {
            return Err(ForecastError::Model(format!(
                "Feature and target count mismatch: {} features, {} targets",
                x.len(),
                y.len()
            )));
        }

        let x_matrix = to_matrix(x)?;
        let params = Self::parameters(config, x[0].len());
        let model = Forest::fit(&x_matrix, &y.to_vec(), params)
            .map_err(|e| ForecastError::Model(format!("RandomForest training failed: {:?}", e)))?;

        let metadata = ModelMetadata {
            model_id: format!("smartcore_rf_{}", uuid::Uuid::new_v4()),
            model_type: ModelType::RandomForest,
            target: target.to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: x.len(),
            holdout_metrics: None,
            feature_names,
        };

        Ok(Self {
            metadata,
            model,
            n_trees: config.n_trees,
            max_depth: config.max_depth,
        })
    }

    /// Predict every row of a feature matrix
    pub fn predict_rows(&self, x: &[Vec<f64>]) -> ForecastResult<Vec<f64>> {
        if x.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .predict(&to_matrix(x)?)
            .map_err(|e| ForecastError::Model(format!("Prediction failed: {:?}", e)))
    }
}

fn to_matrix(x: &[Vec<f64>]) -> ForecastResult<DenseMatrix<f64>> {
    let n_samples = x.len();
    let n_features = x.first().map(Vec::len).unwrap_or_default();

    let mut flat_data = Vec::with_capacity(n_samples * n_features);
    for row in x {
        if row.len() != n_features {
            return Err(ForecastError::Model(
                "All feature vectors must have the same length".to_string(),
            ));
        }
        flat_data.extend_from_slice(row);
    }

    Ok(DenseMatrix::new(n_samples, n_features, flat_data, false))
}

impl MLModel for SmartcoreRandomForest {
    fn predict(&self, features: &FeatureVector) -> ForecastResult<f64> {
        let expected = self.metadata.feature_names.len();
        if features.len() != expected {
            return Err(ForecastError::Model(format!(
                "Feature count mismatch: expected {}, got {}",
                expected,
                features.len()
            )));
        }

        let x = DenseMatrix::new(1, features.len(), features.features.clone(), false);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| ForecastError::Model(format!("Prediction failed: {:?}", e)))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| ForecastError::Model("Model returned empty predictions".to_string()))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(n_trees: usize) -> TrainingConfig {
        TrainingConfig {
            n_trees,
            max_depth: Some(5),
            min_samples_split: 2,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_parameters_follow_config() {
        let params = SmartcoreRandomForest::parameters(&small_config(100), 28);
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.m, Some(28));
        assert_eq!(params.max_depth, Some(5));
        assert_eq!(params.seed, 42);
        assert!(!params.keep_samples);
    }

    #[test]
    fn test_max_features_override() {
        let config = TrainingConfig {
            max_features: Some(5),
            ..small_config(10)
        };
        assert_eq!(SmartcoreRandomForest::parameters(&config, 28).m, Some(5));

        let config = TrainingConfig {
            max_features: Some(64),
            ..small_config(10)
        };
        assert_eq!(SmartcoreRandomForest::parameters(&config, 28).m, Some(28));
    }

    #[test]
    fn test_single_informative_column_among_many() {
        // Only column 4 carries signal; the rest is scrambled noise.
        let x: Vec<Vec<f64>> = (0..400usize)
            .map(|i| {
                (0..28usize)
                    .map(|j| match j {
                        4 => (i % 20) as f64,
                        _ => ((i * 7919 + j * 104_729).wrapping_mul(2_654_435_761) % 1000) as f64,
                    })
                    .collect()
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|row| 2.0 * row[4]).collect();
        let names = (0..28).map(|j| format!("f{}", j)).collect();
        let config = TrainingConfig {
            max_depth: None,
            ..small_config(50)
        };

        let model = SmartcoreRandomForest::train(&x, &y, &config, names, "y").unwrap();
        let predictions = model.predict_rows(&x).unwrap();
        let mae = predictions
            .iter()
            .zip(&y)
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / y.len() as f64;
        assert!(mae < 0.1, "in-sample MAE {}", mae);
    }

    #[test]
    fn test_train_random_forest() {
        // y = 2x1 + 3x2
        let x: Vec<Vec<f64>> = vec![
            vec![1.0, 1.0],
            vec![2.0, 1.0],
            vec![1.0, 2.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 2.0],
            vec![2.0, 4.0],
            vec![3.0, 1.0],
            vec![1.0, 3.0],
            vec![4.0, 4.0],
        ];
        let y: Vec<f64> = vec![5.0, 7.0, 8.0, 10.0, 15.0, 14.0, 14.0, 9.0, 11.0, 20.0];

        let names = vec!["x1".to_string(), "x2".to_string()];
        let model = SmartcoreRandomForest::train(&x, &y, &small_config(10), names, "y").unwrap();
        assert_eq!(model.metadata.training_samples, 10);
        assert_eq!(model.metadata.target, "y");
        assert_eq!(model.n_trees, 10);
        assert_eq!(model.predict_rows(&x).unwrap().len(), 10);
    }

    #[test]
    fn test_predict() {
        let x: Vec<Vec<f64>> = vec![
            vec![1.0, 2.0],
            vec![2.0, 3.0],
            vec![3.0, 4.0],
            vec![4.0, 5.0],
            vec![5.0, 6.0],
        ];
        let y: Vec<f64> = vec![3.0, 5.0, 7.0, 9.0, 11.0];

        let names = vec!["f1".to_string(), "f2".to_string()];
        let model =
            SmartcoreRandomForest::train(&x, &y, &small_config(5), names.clone(), "y").unwrap();

        let features = FeatureVector::new(vec![3.0, 4.0], names.into()).unwrap();
        let value = model.predict(&features).unwrap();

        // Should predict something within the training range
        assert!((3.0..=11.0).contains(&value));
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y = vec![12.0; 20];
        let names = vec!["a".to_string(), "b".to_string()];
        let model = SmartcoreRandomForest::train(&x, &y, &small_config(8), names, "y").unwrap();
        for p in model.predict_rows(&x).unwrap() {
            assert!((p - 12.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err =
            SmartcoreRandomForest::train(&[], &[], &small_config(5), vec![], "y").unwrap_err();
        assert!(matches!(err, ForecastError::Data(_)));
    }

    #[test]
    fn test_wrong_feature_count() {
        let x = vec![vec![1.0, 2.0], vec![2.0, 3.0], vec![3.0, 4.0]];
        let y = vec![1.0, 2.0, 3.0];
        let names = vec!["f1".to_string(), "f2".to_string()];
        let model = SmartcoreRandomForest::train(&x, &y, &small_config(3), names, "y").unwrap();

        let features = FeatureVector::new(vec![1.0], vec!["f1".to_string()].into()).unwrap();
        assert!(model.predict(&features).is_err());
    }
}
