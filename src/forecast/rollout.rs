//! Autoregressive rollout
//!
//! Predicts one period at a time and feeds each prediction back into the lag
//! window of the next step. The only state carried between steps is the
//! [`Cursor`]; the training data is never consulted again, so errors compound
//! with horizon. That degradation is expected.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::features::FeatureRow;
use super::variant::{ForecastVariant, TargetRule};
use crate::error::{ForecastError, ForecastResult};
use crate::ml::{FeatureVector, MLModel};

/// Raw regressor outputs of a two-regressor step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerComponents {
    pub active_kw: f64,
    pub reactive_kw: f64,
}

/// One emitted step of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<PowerComponents>,
}

/// Rollout state: the feature row of the most recent period.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    timestamp: NaiveDateTime,
    calendar: Vec<f64>,
    lags: Vec<f64>,
    value: f64,
}

impl Cursor {
    pub fn from_row(row: &FeatureRow) -> Self {
        Self {
            timestamp: row.timestamp,
            calendar: row.calendar.clone(),
            lags: row.lags.clone(),
            value: row.value,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Move to the next period: lag_k <- lag_(k-1), lag_1 <- value, and
    /// recompute calendar fields.
    fn advance(&mut self, variant: &ForecastVariant) {
        self.timestamp += variant.period.duration();
        self.lags.rotate_right(1);
        self.lags[0] = self.value;
        self.calendar = variant.calendar_values(self.timestamp);
    }

    fn features(&self) -> Vec<f64> {
        self.calendar.iter().chain(self.lags.iter()).copied().collect()
    }
}

/// Step-wise forecast over a frozen set of regressors.
pub struct Rollout<'a> {
    variant: &'a ForecastVariant,
    regressors: &'a [Arc<dyn MLModel>],
    feature_names: Arc<[String]>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a> Rollout<'a> {
    pub fn new(
        variant: &'a ForecastVariant,
        regressors: &'a [Arc<dyn MLModel>],
        anchor: &FeatureRow,
        steps: usize,
    ) -> ForecastResult<Self> {
        let expected = variant.target.regressor_count();
        if regressors.len() != expected {
            return Err(ForecastError::ModelNotReady(format!(
                "{} needs {} fitted regressors, found {}",
                variant.kind,
                expected,
                regressors.len()
            )));
        }
        if anchor.lags.len() != variant.lag_count || variant.lag_count == 0 {
            return Err(ForecastError::Model(format!(
                "Anchor row has {} lags, {} expects {}",
                anchor.lags.len(),
                variant.kind,
                variant.lag_count
            )));
        }

        Ok(Self {
            variant,
            regressors,
            feature_names: variant.feature_names().into(),
            cursor: Cursor::from_row(anchor),
            remaining: steps,
        })
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn step(&mut self) -> ForecastResult<ForecastPoint> {
        self.cursor.advance(self.variant);

        let features = FeatureVector::new(self.cursor.features(), self.feature_names.clone())?;
        let mut outputs = self
            .regressors
            .iter()
            .map(|model| model.predict(&features))
            .collect::<ForecastResult<Vec<f64>>>()?;

        if let Some(clip) = self.variant.clip {
            outputs.iter_mut().for_each(|o| *o = clip.apply(*o));
        }

        let value = self.variant.target.headline(&outputs);
        let components = match self.variant.target {
            TargetRule::PowerComponents => Some(PowerComponents {
                active_kw: outputs[0],
                reactive_kw: outputs[1],
            }),
            TargetRule::Energy | TargetRule::PowerFactor => None,
        };

        self.cursor.value = outputs[0];

        Ok(ForecastPoint {
            timestamp: self.cursor.timestamp,
            value,
            components,
        })
    }
}

impl Iterator for Rollout<'_> {
    type Item = ForecastResult<ForecastPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let point = self.step();
        self.remaining = if point.is_ok() { self.remaining - 1 } else { 0 };
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Run a full rollout of exactly `steps` periods after `anchor`.
pub fn rollout(
    variant: &ForecastVariant,
    regressors: &[Arc<dyn MLModel>],
    anchor: &FeatureRow,
    steps: usize,
) -> ForecastResult<Vec<ForecastPoint>> {
    Rollout::new(variant, regressors, anchor, steps)?.collect()
}
