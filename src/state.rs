//! Process-wide forecasting context
//!
//! Everything a request needs is built once before the server binds and is
//! read-only afterwards; handlers share it through [`AppState`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use strum::IntoEnumIterator;
use tracing::info;

use crate::config::{Config, TrainingSection};
use crate::data::{load_csv, MeterSeries};
use crate::error::{ForecastError, ForecastResult};
use crate::forecast::{Forecast, Predictor, RolloutCache, VariantKind};

#[derive(Debug)]
pub struct ForecastContext {
    series: MeterSeries,
    predictors: HashMap<VariantKind, Predictor>,
    cache: RolloutCache,
}

impl ForecastContext {
    /// Load the configured history and train every variant. Any failure here
    /// is fatal to startup.
    pub fn load(cfg: &Config) -> Result<Self> {
        let series = load_csv(&cfg.data.path, &cfg.data.loader_options())
            .with_context(|| format!("loading {}", cfg.data.path.display()))?;
        Self::build(series, &cfg.training, cfg.cache.enabled).context("training predictors")
    }

    pub fn build(
        series: MeterSeries,
        training: &TrainingSection,
        cache_enabled: bool,
    ) -> ForecastResult<Self> {
        let started = Instant::now();
        let predictors = VariantKind::iter()
            .map(|kind| Predictor::train(training.variant(kind), &series).map(|p| (kind, p)))
            .collect::<ForecastResult<HashMap<_, _>>>()?;

        info!(
            readings = series.len(),
            predictors = predictors.len(),
            cache = cache_enabled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast context ready"
        );

        Ok(Self {
            series,
            predictors,
            cache: RolloutCache::new(cache_enabled),
        })
    }

    /// Context over already-trained predictors. Kinds left out answer with
    /// [`ForecastError::ModelNotReady`].
    pub fn from_predictors(
        series: MeterSeries,
        predictors: impl IntoIterator<Item = Predictor>,
        cache_enabled: bool,
    ) -> Self {
        Self {
            series,
            predictors: predictors.into_iter().map(|p| (p.kind(), p)).collect(),
            cache: RolloutCache::new(cache_enabled),
        }
    }

    pub fn series(&self) -> &MeterSeries {
        &self.series
    }

    pub fn cache(&self) -> &RolloutCache {
        &self.cache
    }

    pub fn predictor(&self, kind: VariantKind) -> ForecastResult<&Predictor> {
        self.predictors
            .get(&kind)
            .ok_or_else(|| ForecastError::ModelNotReady(format!("{} is not trained", kind)))
    }

    pub fn forecast(
        &self,
        kind: VariantKind,
        start: Option<NaiveDateTime>,
        steps: Option<usize>,
    ) -> ForecastResult<Arc<Forecast>> {
        self.cache.forecast(self.predictor(kind)?, start, steps)
    }

    pub fn trained_kinds(&self) -> Vec<VariantKind> {
        VariantKind::iter().filter(|k| self.predictors.contains_key(k)).collect()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<ForecastContext>,
}

impl AppState {
    pub fn new(ctx: ForecastContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}
