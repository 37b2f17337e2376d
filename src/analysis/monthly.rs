//! Calendar-month consumption report.

use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use serde::Serialize;

use super::round_to;
use crate::data::{MeterSeries, READINGS_PER_HOUR};
use crate::error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonthlyAverage {
    Report {
        /// `YYYY-MM`
        month: String,
        total_kwh: f64,
        average_kwh_per_day: f64,
        average_kwh_per_hour: f64,
        sub_meter_avg: f64,
        /// Calendar days in the month, not days with data.
        days: u32,
    },
    NoData {
        month: String,
    },
}

impl MonthlyAverage {
    pub fn month(&self) -> &str {
        match self {
            MonthlyAverage::Report { month, .. } | MonthlyAverage::NoData { month } => month,
        }
    }
}

/// Totals and per-day/per-hour averages for the month containing `date`.
/// Averages divide by the calendar length of the month.
pub fn monthly_average(series: &MeterSeries, date: NaiveDate) -> ForecastResult<MonthlyAverage> {
    let month_start = date
        .with_day(1)
        .ok_or_else(|| ForecastError::range(format!("invalid date {}", date)))?;
    let next_month = month_start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ForecastError::range(format!("{} is out of range", date)))?;
    let days = (next_month - month_start).num_days() as u32;
    let month = month_start.format("%Y-%m").to_string();

    let readings = series.slice(
        month_start.and_time(NaiveTime::MIN),
        next_month.and_time(NaiveTime::MIN),
    );
    if readings.is_empty() {
        return Ok(MonthlyAverage::NoData { month });
    }

    let total_kwh: f64 = readings
        .iter()
        .filter_map(|r| r.active_power_kw)
        .sum::<f64>()
        / READINGS_PER_HOUR;
    let sub_total: f64 = readings.iter().map(|r| r.sub_metering_total()).sum();
    let per_day = total_kwh / f64::from(days);

    Ok(MonthlyAverage::Report {
        month,
        total_kwh: round_to(total_kwh, 3),
        average_kwh_per_day: round_to(per_day, 2),
        average_kwh_per_hour: round_to(per_day / 24.0, 2),
        sub_meter_avg: round_to(sub_total / f64::from(days), 2),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{series_with, ts};
    use rstest::rstest;

    #[rstest]
    #[case(2007, 2, 28)]
    #[case(2008, 2, 29)]
    #[case(2007, 4, 30)]
    #[case(2007, 12, 31)]
    fn test_days_in_month(#[case] y: i32, #[case] m: u32, #[case] expected: u32) {
        let series = series_with(ts(y, m, 1, 0, 0), 1, 1, |_| (1.0, 0.0));
        let report = monthly_average(&series, NaiveDate::from_ymd_opt(y, m, 15).unwrap()).unwrap();
        match report {
            MonthlyAverage::Report { days, .. } => assert_eq!(days, expected),
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_monthly_report() {
        // one day of 1.5 kW readings in a 30-day month
        let series = series_with(ts(2007, 6, 1, 0, 0), 24 * 60, 1, |_| (1.5, 0.0));
        let date = NaiveDate::from_ymd_opt(2007, 6, 20).unwrap();
        let report = monthly_average(&series, date).unwrap();

        assert_eq!(
            report,
            MonthlyAverage::Report {
                month: "2007-06".to_string(),
                total_kwh: 36.0,
                average_kwh_per_day: 1.2,
                average_kwh_per_hour: 0.05,
                sub_meter_avg: 0.29,
                days: 30,
            }
        );
    }

    #[test]
    fn test_month_without_readings() {
        let series = series_with(ts(2007, 6, 1, 0, 0), 10, 1, |_| (1.0, 0.0));
        let date = NaiveDate::from_ymd_opt(2007, 8, 1).unwrap();
        let report = monthly_average(&series, date).unwrap();
        assert_eq!(
            report,
            MonthlyAverage::NoData {
                month: "2007-08".to_string()
            }
        );
        assert_eq!(report.month(), "2007-08");
    }

    #[test]
    fn test_month_boundaries_are_exclusive() {
        let series = series_with(ts(2007, 6, 30, 23, 59), 2, 1, |_| (60.0, 0.0));
        match monthly_average(&series, NaiveDate::from_ymd_opt(2007, 6, 1).unwrap()).unwrap() {
            MonthlyAverage::Report { total_kwh, .. } => assert_eq!(total_kwh, 1.0),
            other => panic!("expected a report, got {:?}", other),
        }
    }
}
