//! Feature engineering for forecasting models
//!
//! Turns a meter series into a calendar-aware lagged feature table for one
//! forecast variant.

use std::sync::Arc;

use chrono::NaiveDateTime;

use super::variant::{ForecastVariant, TargetRule};
use crate::data::{resample, MeterSeries, PeriodBucket};
use crate::domain::power::{interpolate_gaps, power_factor};
use crate::error::{ForecastError, ForecastResult};
use crate::ml::{FeatureVector, TrainingDataset};

/// One period of the feature table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub timestamp: NaiveDateTime,
    pub calendar: Vec<f64>,
    /// `lags[k - 1]` is the lagged quantity `k` periods earlier.
    pub lags: Vec<f64>,
    /// The lagged quantity at this period; it becomes `lag_1` of the next.
    pub value: f64,
    /// One regression target per regressor.
    pub targets: Vec<f64>,
}

impl FeatureRow {
    /// Calendar values followed by lags, in feature-name order.
    pub fn features(&self) -> Vec<f64> {
        self.calendar.iter().chain(self.lags.iter()).copied().collect()
    }
}

/// Lagged feature table, chronological
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub feature_names: Arc<[String]>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|r| r.timestamp)
    }

    /// Latest row at or before `ts`.
    pub fn row_at_or_before(&self, ts: NaiveDateTime) -> Option<&FeatureRow> {
        let idx = self.rows.partition_point(|r| r.timestamp <= ts);
        idx.checked_sub(1).map(|i| &self.rows[i])
    }

    pub fn feature_vector(&self, row: &FeatureRow) -> ForecastResult<FeatureVector> {
        FeatureVector::new(row.features(), self.feature_names.clone())
    }

    /// Features paired with the `target_index`-th target.
    pub fn dataset(&self, target_index: usize) -> ForecastResult<TrainingDataset> {
        let targets = self
            .rows
            .iter()
            .map(|r| {
                r.targets.get(target_index).copied().ok_or_else(|| {
                    ForecastError::Model(format!("No target column {}", target_index))
                })
            })
            .collect::<ForecastResult<Vec<_>>>()?;
        TrainingDataset::new(self.rows.iter().map(FeatureRow::features).collect(), targets)
    }
}

/// Per-period lagged quantity and targets, before lagging.
#[derive(Debug, Clone, Copy)]
struct PeriodValue {
    value: Option<f64>,
    targets: [Option<f64>; 2],
}

/// Builds a [`FeatureTable`] for one variant.
pub struct FeatureBuilder<'a> {
    variant: &'a ForecastVariant,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(variant: &'a ForecastVariant) -> Self {
        Self { variant }
    }

    pub fn build(&self, series: &MeterSeries) -> ForecastResult<FeatureTable> {
        let grid = resample(series.readings(), self.variant.period);
        self.build_from_grid(&grid)
    }

    /// Lags are positional over the dense grid, so a gap invalidates the rows
    /// whose lag window covers it.
    pub fn build_from_grid(&self, grid: &[PeriodBucket]) -> ForecastResult<FeatureTable> {
        let variant = self.variant;
        let lag_count = variant.lag_count;
        if lag_count == 0 {
            return Err(ForecastError::data("lag_count must be at least 1"));
        }

        let values = self.derive(grid);
        let n_targets = variant.target.regressor_count();

        let mut rows = Vec::with_capacity(grid.len().saturating_sub(lag_count));
        for t in lag_count..grid.len() {
            let current = values[t];
            let Some(value) = current.value else { continue };
            let Some(targets) = current.targets[..n_targets]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
            else {
                continue;
            };
            let Some(lags) = (1..=lag_count)
                .map(|k| values[t - k].value)
                .collect::<Option<Vec<f64>>>()
            else {
                continue;
            };

            let timestamp = grid[t].start;
            rows.push(FeatureRow {
                timestamp,
                calendar: variant.calendar_values(timestamp),
                lags,
                value,
                targets,
            });
        }

        Ok(FeatureTable {
            feature_names: variant.feature_names().into(),
            rows,
        })
    }

    fn derive(&self, grid: &[PeriodBucket]) -> Vec<PeriodValue> {
        let hours = self.variant.period.hours();
        match self.variant.target {
            TargetRule::Energy => grid
                .iter()
                .map(|b| {
                    let energy = b.means.map(|m| m.active_kw * hours);
                    PeriodValue {
                        value: energy,
                        targets: [energy, None],
                    }
                })
                .collect(),
            TargetRule::PowerComponents => grid
                .iter()
                .map(|b| {
                    let active = b.means.map(|m| m.active_kw);
                    let reactive = b.means.and_then(|m| m.reactive_kw);
                    PeriodValue {
                        value: active,
                        targets: [active, reactive],
                    }
                })
                .collect(),
            TargetRule::PowerFactor => {
                let raw: Vec<Option<f64>> = grid
                    .iter()
                    .map(|b| {
                        let m = b.means?;
                        let q = m.reactive_kw?;
                        (m.active_kw != 0.0 || q != 0.0).then(|| power_factor(m.active_kw, q))
                    })
                    .collect();
                interpolate_gaps(&raw)
                    .into_iter()
                    .map(|pf| PeriodValue {
                        value: pf,
                        targets: [pf, None],
                    })
                    .collect()
            }
        }
    }
}
