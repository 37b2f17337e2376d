//! Mean resampling onto an hourly or daily grid.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::MeterReading;

/// Resample period of a forecast variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    Hour,
    Day,
}

impl Period {
    pub fn duration(&self) -> Duration {
        match self {
            Period::Hour => Duration::hours(1),
            Period::Day => Duration::days(1),
        }
    }

    /// Hours per period; converts mean power (kW) into energy per period (kWh).
    pub fn hours(&self) -> f64 {
        match self {
            Period::Hour => 1.0,
            Period::Day => 24.0,
        }
    }

    /// Start of the period containing `ts`.
    pub fn floor(&self, ts: NaiveDateTime) -> NaiveDateTime {
        match self {
            Period::Hour => ts
                .date()
                .and_time(NaiveTime::MIN)
                + Duration::hours(i64::from(ts.hour())),
            Period::Day => ts.date().and_time(NaiveTime::MIN),
        }
    }
}

/// Mean active and reactive power over one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodMeans {
    pub active_kw: f64,
    pub reactive_kw: Option<f64>,
}

/// One slot of the dense grid; `means` is `None` when no reading carried
/// active power in the period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub start: NaiveDateTime,
    pub means: Option<PeriodMeans>,
}

#[derive(Default)]
struct Accumulator {
    active_sum: f64,
    active_n: usize,
    reactive_sum: f64,
    reactive_n: usize,
}

impl Accumulator {
    fn means(&self) -> Option<PeriodMeans> {
        if self.active_n == 0 {
            return None;
        }
        Some(PeriodMeans {
            active_kw: self.active_sum / self.active_n as f64,
            reactive_kw: (self.reactive_n > 0).then(|| self.reactive_sum / self.reactive_n as f64),
        })
    }
}

/// Resample readings onto a dense grid from the first to the last period.
pub fn resample(readings: &[MeterReading], period: Period) -> Vec<PeriodBucket> {
    let mut acc: BTreeMap<NaiveDateTime, Accumulator> = BTreeMap::new();
    for r in readings {
        let slot = acc.entry(period.floor(r.timestamp)).or_default();
        if let Some(p) = r.active_power_kw {
            slot.active_sum += p;
            slot.active_n += 1;
        }
        if let Some(q) = r.reactive_power_kw {
            slot.reactive_sum += q;
            slot.reactive_n += 1;
        }
    }

    let (Some(&first), Some(&last)) = (acc.keys().next(), acc.keys().next_back()) else {
        return Vec::new();
    };

    let step = period.duration();
    let mut grid = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        grid.push(PeriodBucket {
            start: cursor,
            means: acc.get(&cursor).and_then(Accumulator::means),
        });
        cursor += step;
    }
    grid
}
