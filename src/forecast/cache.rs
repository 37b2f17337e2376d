//! Memoized rollouts
//!
//! Regressors never change after startup, so a rollout is a pure function of
//! (variant, anchor, steps) and can be reused across requests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::RwLock;
use tracing::debug;

use super::predictor::{Forecast, Predictor};
use super::variant::VariantKind;
use crate::error::ForecastResult;

type CacheKey = (VariantKind, NaiveDateTime, usize);

#[derive(Debug, Default)]
pub struct RolloutCache {
    enabled: bool,
    entries: RwLock<HashMap<CacheKey, Arc<Forecast>>>,
}

impl RolloutCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Forecast through the cache. Errors are never cached.
    pub fn forecast(
        &self,
        predictor: &Predictor,
        start: Option<NaiveDateTime>,
        steps: Option<usize>,
    ) -> ForecastResult<Arc<Forecast>> {
        if !self.enabled {
            return predictor.forecast(start, steps).map(Arc::new);
        }

        let anchor = predictor.anchor(start)?.timestamp;
        let steps = steps.unwrap_or(predictor.variant().default_steps);
        let key = (predictor.kind(), anchor, steps);

        if let Some(hit) = self.entries.read().get(&key) {
            debug!(kind = %key.0, anchor = %anchor, steps, "rollout cache hit");
            return Ok(hit.clone());
        }

        let forecast = Arc::new(predictor.forecast(Some(anchor), Some(steps))?);
        self.entries
            .write()
            .entry(key)
            .or_insert_with(|| forecast.clone());
        Ok(forecast)
    }
}
