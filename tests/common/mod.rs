#![allow(dead_code)]
use std::io::Write;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use household_energy_forecast::config::TrainingSection;
use household_energy_forecast::data::{MeterReading, MeterSeries};
use household_energy_forecast::ml::TrainingConfig;
use tempfile::NamedTempFile;

pub const HEADER: &str = "Date;Time;Global_active_power;Global_reactive_power;Voltage;Global_intensity;Sub_metering_1;Sub_metering_2;Sub_metering_3";

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// Hourly readings from `start` with power `f(i) -> (active, reactive)`.
pub fn hourly_series(
    start: NaiveDateTime,
    hours: usize,
    f: impl Fn(usize) -> (f64, f64),
) -> MeterSeries {
    let readings = (0..hours)
        .map(|i| {
            let (p, q) = f(i);
            MeterReading {
                timestamp: start + Duration::hours(i as i64),
                active_power_kw: Some(p),
                reactive_power_kw: Some(q),
                sub_metering_kwh: [Some(0.001), Some(0.0), Some(0.017)],
            }
        })
        .collect();
    MeterSeries::from_readings(readings).0
}

/// Semicolon-separated export in the household power feed layout.
pub fn write_csv(
    start: NaiveDateTime,
    hours: usize,
    f: impl Fn(usize) -> (f64, f64),
) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for i in 0..hours {
        let t = start + Duration::hours(i as i64);
        let (p, q) = f(i);
        writeln!(
            file,
            "{};{};{:.3};{:.3};240.000;4.000;1.000;0.000;17.000",
            t.format("%-d/%-m/%Y"),
            t.format("%H:%M:%S"),
            p,
            q
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn fast_training(trees: usize) -> TrainingSection {
    let fast = TrainingConfig::default().with_trees(trees).with_test_fraction(0.1);
    TrainingSection {
        daily_energy: Some(fast.clone()),
        hourly_energy: Some(fast.clone()),
        hourly_efficiency: Some(fast.clone()),
        daily_efficiency: Some(fast),
    }
}
