//! Historical mean daily energy per weekday.

use chrono::{Datelike, Weekday};
use itertools::Itertools;
use serde::Serialize;

use super::extremes;
use crate::data::{resample, MeterSeries, Period};
use crate::error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub average_kwh: f64,
    /// Days with data that went into the average.
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayProfile {
    /// Monday first; weekdays never observed are absent.
    pub averages: Vec<WeekdayAverage>,
    pub lowest: Weekday,
    pub highest: Weekday,
}

pub fn weekday_profile(series: &MeterSeries) -> ForecastResult<WeekdayProfile> {
    let hours = Period::Day.hours();
    let groups = resample(series.readings(), Period::Day)
        .into_iter()
        .filter_map(|b| b.means.map(|m| (b.start.weekday(), m.active_kw * hours)))
        .into_group_map_by(|(day, _)| day.num_days_from_monday());

    let averages: Vec<WeekdayAverage> = groups
        .into_iter()
        .sorted_by_key(|(idx, _)| *idx)
        .map(|(_, days)| {
            let total: f64 = days.iter().map(|(_, kwh)| kwh).sum();
            WeekdayAverage {
                weekday: days[0].0,
                average_kwh: total / days.len() as f64,
                days: days.len(),
            }
        })
        .collect();

    let values: Vec<f64> = averages.iter().map(|a| a.average_kwh).collect();
    let ext = extremes(&values)
        .ok_or_else(|| ForecastError::data("no complete days to build a weekday profile"))?;

    Ok(WeekdayProfile {
        lowest: averages[ext.min_index].weekday,
        highest: averages[ext.max_index].weekday,
        averages,
    })
}
