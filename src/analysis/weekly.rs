//! Weekly consumption summaries and week-over-week comparison.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::Serialize;

use crate::data::{MeterReading, MeterSeries, READINGS_PER_HOUR};
use crate::domain::power::power_factor;
use crate::error::{ForecastError, ForecastResult};

const DAYS_PER_WEEK: f64 = 7.0;

/// Consumption figures for one week of readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub total_active_power_kwh: f64,
    pub avg_active_power_kw: f64,
    pub sub_metering_1: f64,
    pub sub_metering_2: f64,
    pub sub_metering_3: f64,
    /// All three channels per day of the week.
    pub sub_metering_avg: f64,
    /// Power factor of the summed active and reactive power.
    pub efficiency: f64,
}

impl WeeklySummary {
    /// Named fields in a fixed order.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("total_active_power_kwh", self.total_active_power_kwh),
            ("avg_active_power_kw", self.avg_active_power_kw),
            ("sub_metering_1", self.sub_metering_1),
            ("sub_metering_2", self.sub_metering_2),
            ("sub_metering_3", self.sub_metering_3),
            ("sub_metering_avg", self.sub_metering_avg),
            ("efficiency", self.efficiency),
        ]
    }
}

/// Summarise a slice of readings. Unparsed values are skipped.
pub fn weekly_summary(readings: &[MeterReading]) -> ForecastResult<WeeklySummary> {
    if readings.is_empty() {
        return Err(ForecastError::range("no readings in the requested week"));
    }

    let active: Vec<f64> = readings.iter().filter_map(|r| r.active_power_kw).collect();
    let p_sum: f64 = active.iter().sum();
    let q_sum: f64 = readings.iter().filter_map(|r| r.reactive_power_kw).sum();
    let channel = |i: usize| -> f64 { readings.iter().filter_map(|r| r.sub_metering_kwh[i]).sum() };
    let (s1, s2, s3) = (channel(0), channel(1), channel(2));

    let avg_active_power_kw = if active.is_empty() {
        0.0
    } else {
        p_sum / active.len() as f64
    };

    Ok(WeeklySummary {
        total_active_power_kwh: p_sum / READINGS_PER_HOUR,
        avg_active_power_kw,
        sub_metering_1: s1,
        sub_metering_2: s2,
        sub_metering_3: s3,
        sub_metering_avg: (s1 + s2 + s3) / DAYS_PER_WEEK,
        efficiency: power_factor(p_sum, q_sum),
    })
}

/// `<field>_diff = this[field] - last[field]` for every summary field.
pub fn week_over_week_diff(this: &WeeklySummary, last: &WeeklySummary) -> BTreeMap<String, f64> {
    this.fields()
        .iter()
        .zip(last.fields().iter())
        .map(|((key, a), (_, b))| (format!("{}_diff", key), a - b))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekComparison {
    pub this_week: WeeklySummary,
    pub last_week: WeeklySummary,
    pub difference: BTreeMap<String, f64>,
}

/// Compare `[start, start + 7d)` with the seven days before it.
pub fn compare_weeks(series: &MeterSeries, start: NaiveDateTime) -> ForecastResult<WeekComparison> {
    let week = Duration::days(7);
    let this_week = weekly_summary(series.slice(start, start + week)).map_err(|_| {
        ForecastError::range(format!("no readings in the week starting {}", start))
    })?;
    let last_week = weekly_summary(series.slice(start - week, start)).map_err(|_| {
        ForecastError::range(format!("no readings in the week before {}", start))
    })?;

    Ok(WeekComparison {
        difference: week_over_week_diff(&this_week, &last_week),
        this_week,
        last_week,
    })
}

/// Sub-metering totals of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySubMetering {
    pub date: NaiveDate,
    pub sub_metering_1: f64,
    pub sub_metering_2: f64,
    pub sub_metering_3: f64,
}

/// Per-day sub-metering sums over `[start, start + 7d)`. Days without
/// readings are absent.
pub fn daily_sub_metering(series: &MeterSeries, start: NaiveDateTime) -> Vec<DailySubMetering> {
    series
        .slice(start, start + Duration::days(7))
        .iter()
        .chunk_by(|r| r.timestamp.date())
        .into_iter()
        .map(|(date, day)| {
            let mut sums = [0.0; 3];
            for r in day {
                for (sum, value) in sums.iter_mut().zip(r.sub_metering_kwh.iter()) {
                    *sum += value.unwrap_or(0.0);
                }
            }
            DailySubMetering {
                date,
                sub_metering_1: sums[0],
                sub_metering_2: sums[1],
                sub_metering_3: sums[2],
            }
        })
        .collect()
}
