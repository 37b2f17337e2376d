//! Delimited-text ingestion for the household power feed.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use super::{MeterReading, MeterSeries};
use crate::error::{ForecastError, ForecastResult};

const DATE_COLUMN: &str = "Date";
const TIME_COLUMN: &str = "Time";
const ACTIVE_COLUMN: &str = "Global_active_power";
const REACTIVE_COLUMN: &str = "Global_reactive_power";
const SUB_METERING_COLUMNS: [&str; 3] = ["Sub_metering_1", "Sub_metering_2", "Sub_metering_3"];

/// Sub-metering is reported in watt-hours.
const SUB_METERING_SCALE: f64 = 1000.0;

/// Day-first formats first, ISO last.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub delimiter: u8,
    /// Inclusive first and last calendar day to keep.
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            window: None,
        }
    }
}

struct ColumnIndex {
    date: usize,
    time: usize,
    active: usize,
    reactive: usize,
    sub_metering: [usize; 3],
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> ForecastResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ForecastError::data(format!("Required column '{}' not found", name)))
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            time: find(TIME_COLUMN)?,
            active: find(ACTIVE_COLUMN)?,
            reactive: find(REACTIVE_COLUMN)?,
            sub_metering: [
                find(SUB_METERING_COLUMNS[0])?,
                find(SUB_METERING_COLUMNS[1])?,
                find(SUB_METERING_COLUMNS[2])?,
            ],
        })
    }
}

/// Load a meter series from a file on disk.
pub fn load_csv(path: &Path, options: &LoaderOptions) -> ForecastResult<MeterSeries> {
    let file = std::fs::File::open(path).map_err(|e| {
        ForecastError::data(format!("Cannot open {}: {}", path.display(), e))
    })?;
    let series = read_series(std::io::BufReader::new(file), options)?;
    info!(
        path = %path.display(),
        readings = series.len(),
        first = ?series.first_timestamp(),
        last = ?series.last_timestamp(),
        "meter data loaded"
    );
    Ok(series)
}

/// Parse, clean and window a meter series from any reader.
pub fn read_series<R: Read>(reader: R, options: &LoaderOptions) -> ForecastResult<MeterSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut readings = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let date = record.get(columns.date).unwrap_or_default();
        let time = record.get(columns.time).unwrap_or_default();
        let timestamp = parse_timestamp(date, time).ok_or_else(|| {
            ForecastError::data(format!(
                "Unparseable timestamp '{} {}' on line {}",
                date, time, line
            ))
        })?;

        readings.push(MeterReading {
            timestamp,
            active_power_kw: parse_number(record.get(columns.active)),
            reactive_power_kw: parse_number(record.get(columns.reactive)),
            sub_metering_kwh: columns
                .sub_metering
                .map(|idx| parse_number(record.get(idx)).map(|wh| wh / SUB_METERING_SCALE)),
        });
    }

    let (mut series, duplicates) = MeterSeries::from_readings(readings);
    if duplicates > 0 {
        warn!(duplicates, "dropped readings with duplicate timestamps");
    }

    if let Some((first, last)) = options.window {
        if last < first {
            return Err(ForecastError::data(format!(
                "Window end {} precedes window start {}",
                last, first
            )));
        }
        let start = first.and_time(NaiveTime::MIN);
        let end = last
            .succ_opt()
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MAX);
        series = series.restrict(start, end);
    }

    if !series.has_active_power() {
        return Err(ForecastError::data(
            "No readings with active power remain after cleaning",
        ));
    }

    Ok(series)
}

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;
    Some(date.and_time(time))
}

/// Unparseable or non-finite values become missing.
fn parse_number(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|f| f.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date;Time;Global_active_power;Global_reactive_power;Voltage;Global_intensity;Sub_metering_1;Sub_metering_2;Sub_metering_3";

    fn load(body: &str, options: &LoaderOptions) -> ForecastResult<MeterSeries> {
        let text = format!("{}\n{}", HEADER, body);
        read_series(text.as_bytes(), options)
    }

    #[test]
    fn test_parses_day_first_dates() {
        let series = load(
            "1/2/2007;00:00:00;2.580;0.136;241.970;10.600;0.000;0.000;0.000\n\
             1/2/2007;00:01:00;2.552;0.100;241.750;10.400;1000.000;0.000;17.000\n",
            &LoaderOptions::default(),
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        let r = series.readings()[1];
        assert_eq!(r.timestamp.to_string(), "2007-02-01 00:01:00");
        assert_eq!(r.active_power_kw, Some(2.552));
        assert_eq!(r.sub_metering_kwh[0], Some(1.0));
        assert_eq!(r.sub_metering_kwh[2], Some(0.017));
    }

    #[test]
    fn test_unparseable_values_become_missing() {
        let series = load(
            "1/2/2007;00:00:00;?;?;?;?;?;?;\n\
             1/2/2007;00:01:00;1.0;0.1;240;4;0;0;0\n",
            &LoaderOptions::default(),
        )
        .unwrap();

        let r = series.readings()[0];
        assert_eq!(r.active_power_kw, None);
        assert_eq!(r.reactive_power_kw, None);
        assert_eq!(r.sub_metering_kwh, [None, None, None]);
    }

    #[test]
    fn test_missing_column_is_data_error() {
        let text = "Date;Time;Global_active_power\n1/2/2007;00:00:00;1.0\n";
        let err = read_series(text.as_bytes(), &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, ForecastError::Data(msg) if msg.contains("Global_reactive_power")));
    }

    #[test]
    fn test_window_is_inclusive_by_day() {
        let options = LoaderOptions {
            delimiter: b';',
            window: Some((
                NaiveDate::from_ymd_opt(2007, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2007, 12, 31).unwrap(),
            )),
        };
        let series = load(
            "31/12/2006;23:59:00;1;0;0;0;0;0;0\n\
             1/1/2007;00:00:00;1;0;0;0;0;0;0\n\
             31/12/2007;23:59:00;1;0;0;0;0;0;0\n\
             1/1/2008;00:00:00;1;0;0;0;0;0;0\n",
            &options,
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last_timestamp().unwrap().to_string(), "2007-12-31 23:59:00");
    }

    #[test]
    fn test_empty_after_cleaning_is_data_error() {
        let err = load("1/2/2007;00:00:00;?;0.1;0;0;0;0;0\n", &LoaderOptions::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::Data(_)));
    }

    #[test]
    fn test_bad_timestamp_names_line() {
        let err = load("yesterday;noon;1;0;0;0;0;0;0\n", &LoaderOptions::default()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_comma_delimited_iso_dates() {
        let text = "Date,Time,Global_active_power,Global_reactive_power,Sub_metering_1,Sub_metering_2,Sub_metering_3\n\
                    2007-03-04,10:15,0.5,0.05,0,0,0\n";
        let options = LoaderOptions {
            delimiter: b',',
            window: None,
        };
        let series = read_series(text.as_bytes(), &options).unwrap();
        assert_eq!(series.first_timestamp().unwrap().to_string(), "2007-03-04 10:15:00");
    }
}
