//! Forecast variant descriptors
//!
//! The four predictors differ only in the values held here: resample period,
//! calendar features, lag depth, how targets are derived, how many regressors
//! run in parallel, and whether predictions are clipped.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::data::Period;
use crate::domain::power::power_factor;
use crate::ml::TrainingConfig;

/// Identity of a built-in predictor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariantKind {
    DailyEnergy,
    HourlyEnergy,
    HourlyEfficiency,
    DailyEfficiency,
}

/// Calendar feature derived from a period's start timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CalendarField {
    /// 0-23
    HourOfDay,
    /// 0=Monday, 6=Sunday
    DayOfWeek,
    /// 1-31
    DayOfMonth,
    /// 1-12
    Month,
}

impl CalendarField {
    pub fn value(&self, ts: NaiveDateTime) -> f64 {
        let v = match self {
            CalendarField::HourOfDay => ts.hour(),
            CalendarField::DayOfWeek => ts.weekday().num_days_from_monday(),
            CalendarField::DayOfMonth => ts.day(),
            CalendarField::Month => ts.month(),
        };
        f64::from(v)
    }
}

/// How the lagged quantity and the regression targets are derived from a
/// period's mean active/reactive power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    /// Energy per period (kWh); one regressor, identity headline.
    Energy,
    /// Power factor of the period means; one regressor, identity headline.
    PowerFactor,
    /// Active and reactive power as two regressors; the active component is
    /// lagged and the headline is their power factor.
    PowerComponents,
}

impl TargetRule {
    pub fn regressor_count(&self) -> usize {
        match self {
            TargetRule::Energy | TargetRule::PowerFactor => 1,
            TargetRule::PowerComponents => 2,
        }
    }

    pub fn target_names(&self) -> &'static [&'static str] {
        match self {
            TargetRule::Energy => &["energy_kwh"],
            TargetRule::PowerFactor => &["power_factor"],
            TargetRule::PowerComponents => &["active_power_kw", "reactive_power_kw"],
        }
    }

    /// Headline value from one step's regressor outputs.
    pub fn headline(&self, outputs: &[f64]) -> f64 {
        match self {
            TargetRule::Energy | TargetRule::PowerFactor => outputs[0],
            TargetRule::PowerComponents => power_factor(outputs[0], outputs[1]),
        }
    }
}

/// Closed range predictions are clamped into before they are emitted or fed back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub min: f64,
    pub max: f64,
}

impl ClipRange {
    pub const UNIT: ClipRange = ClipRange { min: 0.0, max: 1.0 };

    pub fn apply(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Descriptor of one forecasting pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastVariant {
    pub kind: VariantKind,
    pub period: Period,
    pub calendar: Vec<CalendarField>,
    pub lag_count: usize,
    pub target: TargetRule,
    pub clip: Option<ClipRange>,
    pub default_steps: usize,
    pub training: TrainingConfig,
}

impl ForecastVariant {
    pub fn daily_energy() -> Self {
        Self {
            kind: VariantKind::DailyEnergy,
            period: Period::Day,
            calendar: vec![CalendarField::DayOfWeek, CalendarField::Month],
            lag_count: 7,
            target: TargetRule::Energy,
            clip: None,
            default_steps: 7,
            training: TrainingConfig::default().with_trees(300).with_test_fraction(0.2),
        }
    }

    pub fn hourly_energy() -> Self {
        Self {
            kind: VariantKind::HourlyEnergy,
            period: Period::Hour,
            calendar: vec![
                CalendarField::HourOfDay,
                CalendarField::DayOfMonth,
                CalendarField::DayOfWeek,
                CalendarField::Month,
            ],
            lag_count: 24,
            target: TargetRule::Energy,
            clip: None,
            default_steps: 24,
            training: TrainingConfig::default().with_trees(300).with_test_fraction(0.1),
        }
    }

    pub fn hourly_efficiency() -> Self {
        Self {
            kind: VariantKind::HourlyEfficiency,
            period: Period::Hour,
            calendar: vec![CalendarField::HourOfDay, CalendarField::DayOfWeek],
            lag_count: 48,
            target: TargetRule::PowerComponents,
            clip: None,
            default_steps: 24,
            training: TrainingConfig::default().with_trees(200).with_test_fraction(0.1),
        }
    }

    pub fn daily_efficiency() -> Self {
        Self {
            kind: VariantKind::DailyEfficiency,
            period: Period::Day,
            calendar: vec![CalendarField::DayOfWeek],
            lag_count: 3,
            target: TargetRule::PowerFactor,
            clip: Some(ClipRange::UNIT),
            default_steps: 7,
            training: TrainingConfig::default().with_trees(200).with_test_fraction(0.1),
        }
    }

    pub fn for_kind(kind: VariantKind) -> Self {
        match kind {
            VariantKind::DailyEnergy => Self::daily_energy(),
            VariantKind::HourlyEnergy => Self::hourly_energy(),
            VariantKind::HourlyEfficiency => Self::hourly_efficiency(),
            VariantKind::DailyEfficiency => Self::daily_efficiency(),
        }
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Calendar names first, then `lag_1..lag_H`.
    pub fn feature_names(&self) -> Vec<String> {
        self.calendar
            .iter()
            .map(|c| c.to_string())
            .chain((1..=self.lag_count).map(|k| format!("lag_{}", k)))
            .collect()
    }

    pub fn calendar_values(&self, ts: NaiveDateTime) -> Vec<f64> {
        self.calendar.iter().map(|c| c.value(ts)).collect()
    }
}
