//! Causal lag construction

use super::{EngineeredDataset, FeatureRow};
use crate::data::{Dataset, Observation};
use crate::schema::{FeatureSchema, FeatureSource};
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

/// Two observations are contiguous when `next` is exactly one hour after `prev`
pub fn is_contiguous(prev: NaiveDateTime, next: NaiveDateTime) -> bool {
    next - prev == Duration::hours(1)
}

/// Pair every observation with the target of the observation one hour earlier.
///
/// Runs on the raw dataset so lag values are true historical targets. The
/// first observation of every contiguous run has no predecessor and is
/// dropped.
pub fn build_feature_rows(dataset: &Dataset, schema: &FeatureSchema) -> EngineeredDataset {
    let observations = dataset.observations();
    let mut out = EngineeredDataset::default();
    let mut run_starts = 0usize;

    for (i, obs) in observations.iter().enumerate() {
        let lag = match i.checked_sub(1).map(|p| &observations[p]) {
            Some(prev) if is_contiguous(prev.timestamp, obs.timestamp) => prev.pm25,
            _ => {
                run_starts += 1;
                continue;
            }
        };

        out.rows.push(feature_row(obs, lag, schema));
        out.targets.push(obs.pm25);
        out.timestamps.push(obs.timestamp);
    }

    debug!(
        observations = observations.len(),
        feature_rows = out.len(),
        dropped_run_starts = run_starts,
        "Lag features built"
    );

    out
}

fn feature_row(obs: &Observation, lag: f64, schema: &FeatureSchema) -> FeatureRow {
    let numeric = schema
        .numeric()
        .map(|spec| match spec.source {
            FeatureSource::Measurement => obs.measurement(spec.name),
            FeatureSource::Timestamp => match spec.name {
                "hour" => Some(obs.hour() as f64),
                "month" => Some(obs.month() as f64),
                _ => None,
            },
            FeatureSource::Lag => Some(lag),
        })
        .collect();

    let categorical = schema
        .categorical()
        .map(|spec| match spec.name {
            "cbwd" => obs.cbwd.clone(),
            _ => None,
        })
        .collect();

    FeatureRow::new(numeric, categorical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LAG_FEATURE;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_lag_is_previous_target() {
        let ds = Dataset::from_observations(vec![
            Observation::new(at(1, 0), 10.0),
            Observation::new(at(1, 1), 20.0),
            Observation::new(at(1, 2), 30.0),
        ])
        .unwrap();
        let schema = FeatureSchema::air_quality();
        let lag_idx = schema.numeric_index(LAG_FEATURE).unwrap();

        let eng = build_feature_rows(&ds, &schema);
        assert_eq!(eng.len(), 2);
        assert_eq!(eng.targets, vec![20.0, 30.0]);
        let lags: Vec<_> = eng.rows.iter().map(|r| r.numeric[lag_idx]).collect();
        assert_eq!(lags, vec![Some(10.0), Some(20.0)]);
        assert_eq!(eng.timestamps, vec![at(1, 1), at(1, 2)]);
    }

    #[test]
    fn test_gap_starts_new_run() {
        let ds = Dataset::from_observations(vec![
            Observation::new(at(1, 0), 10.0),
            Observation::new(at(1, 1), 20.0),
            Observation::new(at(1, 5), 50.0),
            Observation::new(at(1, 6), 60.0),
        ])
        .unwrap();
        let eng = build_feature_rows(&ds, &FeatureSchema::air_quality());
        assert_eq!(eng.targets, vec![20.0, 60.0]);
    }

    #[test]
    fn test_contiguity_across_midnight() {
        assert!(is_contiguous(at(1, 23), at(2, 0)));
        assert!(!is_contiguous(at(1, 22), at(2, 0)));
    }

    #[test]
    fn test_timestamp_features_and_measurements() {
        let ds = Dataset::from_observations(vec![
            Observation::new(at(3, 7), 1.0),
            Observation::new(at(3, 8), 2.0)
                .with_measurement("TEMP", -3.0)
                .with_wind("NE"),
        ])
        .unwrap();
        let schema = FeatureSchema::air_quality();
        let eng = build_feature_rows(&ds, &schema);
        let row = &eng.rows[0];
        assert_eq!(row.numeric[schema.numeric_index("hour").unwrap()], Some(8.0));
        assert_eq!(row.numeric[schema.numeric_index("month").unwrap()], Some(1.0));
        assert_eq!(row.numeric[schema.numeric_index("TEMP").unwrap()], Some(-3.0));
        assert_eq!(row.numeric[schema.numeric_index("DEWP").unwrap()], None);
        assert_eq!(row.categorical, vec![Some("NE".to_string())]);
    }

    #[test]
    fn test_single_observation_yields_nothing() {
        let ds = Dataset::from_observations(vec![Observation::new(at(1, 0), 10.0)]).unwrap();
        assert!(build_feature_rows(&ds, &FeatureSchema::air_quality()).is_empty());
    }
}
