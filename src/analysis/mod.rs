//! Aggregations over raw readings and forecasts
//!
//! Read-only reporting on top of the [`MeterSeries`](crate::data::MeterSeries):
//! forecast extremes, weekly and monthly summaries, and the historical
//! weekday profile.

pub mod monthly;
pub mod profile;
pub mod weekly;

pub use monthly::{monthly_average, MonthlyAverage};
pub use profile::{weekday_profile, WeekdayAverage, WeekdayProfile};
pub use weekly::{
    compare_weeks, daily_sub_metering, week_over_week_diff, weekly_summary, DailySubMetering,
    WeekComparison, WeeklySummary,
};

use serde::Serialize;

use crate::forecast::{Forecast, ForecastPoint};

/// Positions of the minimum and maximum of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremes {
    pub min_index: usize,
    pub max_index: usize,
}

/// Index of the smallest and largest value. Ties resolve to the first
/// occurrence; NaN never wins.
pub fn extremes(values: &[f64]) -> Option<Extremes> {
    let mut iter = values.iter().enumerate().filter(|(_, v)| !v.is_nan());
    let (first, &v0) = iter.next()?;
    let (mut min_index, mut min) = (first, v0);
    let (mut max_index, mut max) = (first, v0);

    for (i, &v) in iter {
        if v < min {
            min = v;
            min_index = i;
        }
        if v > max {
            max = v;
            max_index = i;
        }
    }

    Some(Extremes {
        min_index,
        max_index,
    })
}

/// A forecast together with its cheapest and most expensive period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub points: Vec<ForecastPoint>,
    /// Best period to consume.
    pub lowest: ForecastPoint,
    pub highest: ForecastPoint,
}

impl ForecastSummary {
    pub fn from_points(points: Vec<ForecastPoint>) -> Option<Self> {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let ext = extremes(&values)?;
        Some(Self {
            lowest: points[ext.min_index],
            highest: points[ext.max_index],
            points,
        })
    }

    pub fn from_forecast(forecast: &Forecast) -> Option<Self> {
        Self::from_points(forecast.points.clone())
    }
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
