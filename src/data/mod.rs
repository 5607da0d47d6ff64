//! Observations and datasets
//!
//! A [`RawRecord`] is one row of the training table as read from disk. A
//! [`Dataset`] is the cleaned, time-ordered sequence of [`Observation`]s the
//! feature pipeline works on: rows without a target or without a valid
//! calendar timestamp never make it into a dataset.

mod loader;

pub use loader::{load_csv, load_dataset, records_from_frame};

use crate::error::{AirqError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Meteorological measurement columns, in schema order
pub const MEASUREMENT_COLUMNS: [&str; 6] = ["DEWP", "TEMP", "PRES", "Iws", "Is", "Ir"];

/// One row of the raw training table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub hour: Option<i64>,
    pub pm25: Option<f64>,
    /// Values for [`MEASUREMENT_COLUMNS`], same order
    pub measurements: [Option<f64>; 6],
    pub cbwd: Option<String>,
}

impl RawRecord {
    /// Timestamp derived from year/month/day/hour, if those form a valid date
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let year = i32::try_from(self.year?).ok()?;
        let month = u32::try_from(self.month?).ok()?;
        let day = u32::try_from(self.day?).ok()?;
        let hour = u32::try_from(self.hour?).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
    }
}

/// A timestamped hourly observation with a known target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    /// PM2.5 concentration
    pub pm25: f64,
    pub measurements: [Option<f64>; 6],
    pub cbwd: Option<String>,
}

impl Observation {
    /// Create an observation with all measurements missing
    pub fn new(timestamp: NaiveDateTime, pm25: f64) -> Self {
        Self {
            timestamp,
            pm25,
            measurements: [None; 6],
            cbwd: None,
        }
    }

    /// Set a measurement by column name
    pub fn with_measurement(mut self, name: &str, value: f64) -> Self {
        if let Some(idx) = MEASUREMENT_COLUMNS.iter().position(|c| *c == name) {
            self.measurements[idx] = Some(value);
        }
        self
    }

    /// Set all six measurements in schema order
    pub fn with_measurements(mut self, values: [f64; 6]) -> Self {
        self.measurements = values.map(Some);
        self
    }

    /// Set the wind direction
    pub fn with_wind(mut self, cbwd: impl Into<String>) -> Self {
        self.cbwd = Some(cbwd.into());
        self
    }

    /// Value of a measurement column, `None` if missing or not a measurement
    pub fn measurement(&self, name: &str) -> Option<f64> {
        MEASUREMENT_COLUMNS
            .iter()
            .position(|c| *c == name)
            .and_then(|idx| self.measurements[idx])
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }
}

/// Counts of rows removed while building a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub total_rows: usize,
    pub missing_target: usize,
    pub invalid_timestamp: usize,
}

/// Time-ordered sequence of observations with strictly increasing timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    observations: Vec<Observation>,
    stats: CleaningStats,
}

impl Dataset {
    /// Build a dataset from raw table rows, dropping rows with a missing
    /// target or an unparseable timestamp.
    pub fn from_records(records: Vec<RawRecord>) -> Result<Self> {
        let mut stats = CleaningStats {
            total_rows: records.len(),
            ..Default::default()
        };

        let mut observations = Vec::with_capacity(records.len());
        for record in records {
            let pm25 = match record.pm25 {
                Some(v) if v.is_finite() => v,
                _ => {
                    stats.missing_target += 1;
                    continue;
                }
            };
            let Some(timestamp) = record.timestamp() else {
                stats.invalid_timestamp += 1;
                continue;
            };
            observations.push(Observation {
                timestamp,
                pm25,
                measurements: record.measurements,
                cbwd: record.cbwd,
            });
        }

        if stats.missing_target > 0 || stats.invalid_timestamp > 0 {
            warn!(
                total_rows = stats.total_rows,
                missing_target = stats.missing_target,
                invalid_timestamp = stats.invalid_timestamp,
                "Dropped rows while building dataset"
            );
        }

        let mut dataset = Self::from_observations(observations)?;
        dataset.stats = stats;
        Ok(dataset)
    }

    /// Build a dataset from observations, ordering them by timestamp.
    pub fn from_observations(mut observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(AirqError::DataError(
                "no rows with a valid timestamp and target".to_string(),
            ));
        }

        observations.sort_by_key(|o| o.timestamp);

        if let Some(pair) = observations.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(AirqError::DataError(format!(
                "duplicate timestamp {}",
                pair[0].timestamp
            )));
        }

        debug!(
            rows = observations.len(),
            first = %observations[0].timestamp,
            last = %observations[observations.len() - 1].timestamp,
            "Dataset built"
        );

        let total_rows = observations.len();
        Ok(Self {
            observations,
            stats: CleaningStats {
                total_rows,
                ..Default::default()
            },
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Row counts from cleaning
    pub fn cleaning_stats(&self) -> CleaningStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i64, month: i64, day: i64, hour: i64, pm25: Option<f64>) -> RawRecord {
        RawRecord {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            hour: Some(hour),
            pm25,
            ..Default::default()
        }
    }

    #[test]
    fn test_timestamp_parsing() {
        let r = record(2010, 1, 2, 5, Some(1.0));
        let ts = r.timestamp().unwrap();
        assert_eq!(ts.hour(), 5);
        assert_eq!(ts.day(), 2);

        assert!(record(2010, 2, 30, 0, Some(1.0)).timestamp().is_none());
        assert!(record(2010, 1, 1, 24, Some(1.0)).timestamp().is_none());
        assert!(RawRecord::default().timestamp().is_none());
    }

    #[test]
    fn test_drops_missing_target_and_bad_timestamp() {
        let records = vec![
            record(2010, 1, 1, 0, Some(10.0)),
            record(2010, 1, 1, 1, None),
            record(2010, 13, 1, 2, Some(30.0)),
            record(2010, 1, 1, 3, Some(40.0)),
        ];
        let ds = Dataset::from_records(records).unwrap();
        assert_eq!(ds.len(), 2);
        let stats = ds.cleaning_stats();
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.missing_target, 1);
        assert_eq!(stats.invalid_timestamp, 1);
    }

    #[test]
    fn test_sorted_by_timestamp() {
        let records = vec![
            record(2010, 1, 1, 2, Some(30.0)),
            record(2010, 1, 1, 0, Some(10.0)),
            record(2010, 1, 1, 1, Some(20.0)),
        ];
        let ds = Dataset::from_records(records).unwrap();
        let targets: Vec<f64> = ds.iter().map(|o| o.pm25).collect();
        assert_eq!(targets, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let records = vec![
            record(2010, 1, 1, 0, Some(10.0)),
            record(2010, 1, 1, 0, Some(11.0)),
        ];
        assert!(matches!(
            Dataset::from_records(records),
            Err(AirqError::DataError(_))
        ));
    }

    #[test]
    fn test_empty_after_filtering() {
        let records = vec![record(2010, 1, 1, 0, None)];
        assert!(matches!(
            Dataset::from_records(records),
            Err(AirqError::DataError(_))
        ));
    }

    #[test]
    fn test_measurement_lookup() {
        let ts = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let obs = Observation::new(ts, 5.0).with_measurement("TEMP", -4.0);
        assert_eq!(obs.measurement("TEMP"), Some(-4.0));
        assert_eq!(obs.measurement("DEWP"), None);
        assert_eq!(obs.measurement("cbwd"), None);
    }
}
