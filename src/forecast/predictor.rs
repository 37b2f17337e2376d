//! Fit-once, predict-many wrapper around one forecast variant.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use super::features::{FeatureBuilder, FeatureRow, FeatureTable};
use super::rollout::{rollout, ForecastPoint};
use super::variant::{ForecastVariant, VariantKind};
use crate::data::{MeterSeries, Period};
use crate::error::{ForecastError, ForecastResult};
use crate::ml::{MLModel, ModelMetadata, ModelTrainer};

/// Output of one rollout call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub kind: VariantKind,
    pub period: Period,
    /// Timestamp of the last observed period the rollout started from.
    pub anchor: NaiveDateTime,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// A trained predictor. Immutable after construction.
pub struct Predictor {
    variant: ForecastVariant,
    table: FeatureTable,
    regressors: Vec<Arc<dyn MLModel>>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("kind", &self.variant.kind)
            .field("rows", &self.table.len())
            .field("regressors", &self.regressors.len())
            .finish()
    }
}

impl Predictor {
    /// Build the feature table and fit one regressor per target.
    pub fn train(variant: ForecastVariant, series: &MeterSeries) -> ForecastResult<Self> {
        let started = Instant::now();
        let table = FeatureBuilder::new(&variant).build(series)?;
        if table.is_empty() {
            return Err(ForecastError::data(format!(
                "{}: no complete feature rows (need more than {} {}s of history)",
                variant.kind, variant.lag_count, variant.period
            )));
        }
        debug!(kind = %variant.kind, rows = table.len(), "feature table built");

        let trainer = ModelTrainer::new(variant.training.clone());
        let regressors = variant
            .target
            .target_names()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let dataset = table.dataset(idx)?;
                let model =
                    trainer.fit_random_forest(&dataset, table.feature_names.to_vec(), name)?;
                Ok(Arc::new(model) as Arc<dyn MLModel>)
            })
            .collect::<ForecastResult<Vec<_>>>()?;

        info!(
            kind = %variant.kind,
            rows = table.len(),
            regressors = regressors.len(),
            trees = variant.training.n_trees,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "predictor trained"
        );

        Ok(Self {
            variant,
            table,
            regressors,
        })
    }

    /// Assemble a predictor from an existing table and fitted regressors.
    pub fn from_parts(
        variant: ForecastVariant,
        table: FeatureTable,
        regressors: Vec<Arc<dyn MLModel>>,
    ) -> ForecastResult<Self> {
        if regressors.len() != variant.target.regressor_count() {
            return Err(ForecastError::ModelNotReady(format!(
                "{} needs {} regressors, got {}",
                variant.kind,
                variant.target.regressor_count(),
                regressors.len()
            )));
        }
        Ok(Self {
            variant,
            table,
            regressors,
        })
    }

    pub fn kind(&self) -> VariantKind {
        self.variant.kind
    }

    pub fn variant(&self) -> &ForecastVariant {
        &self.variant
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn model_metadata(&self) -> Vec<&ModelMetadata> {
        self.regressors.iter().map(|r| r.metadata()).collect()
    }

    /// Holdout MAE of the headline regressor, when a holdout was kept.
    pub fn holdout_error(&self) -> Option<f64> {
        self.regressors
            .first()
            .and_then(|r| r.metadata().holdout_metrics)
            .map(|m| m.mae)
    }

    /// Row the rollout starts from: the latest one, or the latest at or
    /// before `start`.
    pub fn anchor(&self, start: Option<NaiveDateTime>) -> ForecastResult<&FeatureRow> {
        let (Some(first), Some(last)) = (self.table.first_timestamp(), self.table.last_timestamp())
        else {
            return Err(ForecastError::ModelNotReady(format!(
                "{} has no feature rows",
                self.variant.kind
            )));
        };

        let Some(start) = start else {
            return self
                .table
                .last()
                .ok_or_else(|| ForecastError::ModelNotReady(self.variant.kind.to_string()));
        };

        if start > last {
            return Err(ForecastError::range(format!(
                "{} is beyond the last available period {}",
                start, last
            )));
        }
        self.table.row_at_or_before(start).ok_or_else(|| {
            ForecastError::range(format!(
                "{} precedes the first forecastable period {}",
                start, first
            ))
        })
    }

    /// Roll out `steps` periods (the variant default when `None`).
    pub fn forecast(
        &self,
        start: Option<NaiveDateTime>,
        steps: Option<usize>,
    ) -> ForecastResult<Forecast> {
        let anchor = self.anchor(start)?;
        let steps = steps.unwrap_or(self.variant.default_steps);
        let points = rollout(&self.variant, &self.regressors, anchor, steps)?;

        Ok(Forecast {
            kind: self.variant.kind,
            period: self.variant.period,
            anchor: anchor.timestamp,
            points,
        })
    }
}
