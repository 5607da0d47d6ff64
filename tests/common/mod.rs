//! Shared fixtures for integration tests

#![allow(dead_code)]

use airq::prelude::*;
use airq::training::HyperparameterGrid;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;

pub const WINDS: [&str; 4] = ["NW", "NE", "SW", "SE"];

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly observations where PM2.5 depends on humidity spread, wind and
/// the previous hour. Wind directions never include `cv`.
pub fn synthetic_observations(n_hours: usize, seed: u64) -> Vec<Observation> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pm25: f64 = 60.0;

    (0..n_hours)
        .map(|i| {
            let dewp = rng.gen_range(-25.0..20.0);
            let temp = rng.gen_range(-10.0..35.0);
            let iws = rng.gen_range(0.0..40.0);
            let wind = WINDS[i % WINDS.len()];
            let wind_effect = if wind == "SE" { 25.0 } else { 0.0 };
            pm25 = (0.6 * pm25 + 1.2 * (dewp - temp) + 50.0 + wind_effect - 0.5 * iws
                + rng.gen_range(-5.0..5.0))
            .max(2.0);

            Observation::new(start() + Duration::hours(i as i64), pm25)
                .with_measurements([dewp, temp, rng.gen_range(1000.0..1035.0), iws, 0.0, 0.0])
                .with_wind(wind)
        })
        .collect()
}

pub fn synthetic_dataset(n_hours: usize) -> Dataset {
    Dataset::from_observations(synthetic_observations(n_hours, 42)).unwrap()
}

/// Small grid so integration tests stay fast
pub fn small_config() -> TrainingConfig {
    TrainingConfig::default().with_grid(HyperparameterGrid::new(
        vec![8, 16],
        vec![Some(6), None],
        vec![2, 5],
    ))
}

/// Write observations as a raw CSV with `NA` for missing values
pub fn write_csv(path: &Path, observations: &[Observation]) {
    use chrono::{Datelike, Timelike};

    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "No,year,month,day,hour,pm2.5,DEWP,TEMP,PRES,cbwd,Iws,Is,Ir").unwrap();
    let fmt = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |v| v.to_string());

    for (i, obs) in observations.iter().enumerate() {
        let m = obs.measurements;
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            i + 1,
            obs.timestamp.year(),
            obs.timestamp.month(),
            obs.timestamp.day(),
            obs.timestamp.hour(),
            obs.pm25,
            fmt(m[0]),
            fmt(m[1]),
            fmt(m[2]),
            obs.cbwd.as_deref().unwrap_or("NA"),
            fmt(m[3]),
            fmt(m[4]),
            fmt(m[5]),
        )
        .unwrap();
    }
}

pub fn valid_request() -> Value {
    json!({
        "DEWP": -16,
        "TEMP": -4.0,
        "PRES": 1020,
        "Iws": 1.79,
        "Is": 0,
        "Ir": 0,
        "cbwd": "NW",
        "hour": 12,
        "month": 1,
        "pm2_5_lag1": 129.0
    })
}
