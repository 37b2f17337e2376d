//! Smart-meter history
//!
//! A [`MeterSeries`] is the read-only, time-indexed table the whole process
//! works from. It is loaded once at startup and never mutated afterwards.

pub mod loader;
pub mod resample;

pub use loader::{load_csv, LoaderOptions};
pub use resample::{resample, Period, PeriodBucket};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Minutes in one reading of the source feed.
pub const READINGS_PER_HOUR: f64 = 60.0;

/// One base-interval reading. Channels that failed to parse are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub timestamp: NaiveDateTime,
    /// Global active power (kW)
    pub active_power_kw: Option<f64>,
    /// Global reactive power (kW)
    pub reactive_power_kw: Option<f64>,
    /// Sub-metering channels 1..3 (kWh)
    pub sub_metering_kwh: [Option<f64>; 3],
}

impl MeterReading {
    /// Energy drawn during this one-minute reading (kWh).
    pub fn energy_kwh(&self) -> Option<f64> {
        self.active_power_kw.map(|kw| kw / READINGS_PER_HOUR)
    }

    /// Sum of the parsed sub-metering channels.
    pub fn sub_metering_total(&self) -> f64 {
        self.sub_metering_kwh.iter().flatten().sum()
    }
}

/// Readings ordered by strictly increasing timestamp.
#[derive(Debug, Clone, Default)]
pub struct MeterSeries {
    readings: Vec<MeterReading>,
}

impl MeterSeries {
    /// Build a series, sorting by timestamp and keeping the first of any
    /// duplicates. Returns the series and the number of duplicates dropped.
    pub fn from_readings(mut readings: Vec<MeterReading>) -> (Self, usize) {
        readings.sort_by_key(|r| r.timestamp);
        let before = readings.len();
        readings.dedup_by_key(|r| r.timestamp);
        let dropped = before - readings.len();
        (Self { readings }, dropped)
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.last().map(|r| r.timestamp)
    }

    /// Readings with `start <= timestamp < end`.
    pub fn slice(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[MeterReading] {
        if end <= start {
            return &[];
        }
        let lo = self.readings.partition_point(|r| r.timestamp < start);
        let hi = self.readings.partition_point(|r| r.timestamp < end);
        &self.readings[lo..hi]
    }

    /// Keep readings whose timestamp falls in `[start, end)`.
    pub fn restrict(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            readings: self.slice(start, end).to_vec(),
        }
    }

    /// Whether any reading carries an active-power value.
    pub fn has_active_power(&self) -> bool {
        self.readings.iter().any(|r| r.active_power_kw.is_some())
    }
}
