//! Integration test: raw CSV → dataset → lagged features → design matrix

mod common;

use airq::data::load_dataset;
use airq::error::AirqError;
use airq::inference::PredictionRequest;
use airq::preprocessing::FeaturePipeline;
use airq::schema::{FeatureSchema, LAG_FEATURE};
use common::{synthetic_observations, write_csv};
use serde_json::json;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_csv_round_trip_into_dataset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("air.csv");
    let observations = synthetic_observations(48, 1);
    write_csv(&path, &observations);

    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.len(), 48);
    assert_eq!(dataset.observations()[10], observations[10]);
    assert_eq!(dataset.cleaning_stats().total_rows, 48);
}

#[test]
fn test_missing_target_rows_are_dropped_and_break_runs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("air.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "No,year,month,day,hour,pm2.5,DEWP,TEMP,PRES,cbwd,Iws,Is,Ir").unwrap();
    writeln!(file, "1,2010,1,1,0,NA,-21,-11,1021,NW,1.79,0,0").unwrap();
    writeln!(file, "2,2010,1,1,1,100,-21,-12,1020,NW,4.92,0,0").unwrap();
    writeln!(file, "3,2010,1,1,2,110,-21,NA,1019,NW,6.71,0,0").unwrap();
    writeln!(file, "4,2010,1,1,3,NA,-21,-14,1019,NW,9.84,0,0").unwrap();
    writeln!(file, "5,2010,1,1,4,130,-20,-12,1018,cv,12.97,0,0").unwrap();
    writeln!(file, "6,2010,1,1,5,140,-19,-10,1017,NE,0.89,0,0").unwrap();
    drop(file);

    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.cleaning_stats().missing_target, 2);

    let schema = FeatureSchema::air_quality();
    let engineered = FeaturePipeline::new(schema).engineer(&dataset);
    // hour 2 follows hour 1; hour 5 follows hour 4; hour 4 has no predecessor
    assert_eq!(engineered.targets, vec![110.0, 140.0]);

    let lag = schema.numeric_index(LAG_FEATURE).unwrap();
    let temp = schema.numeric_index("TEMP").unwrap();
    assert_eq!(engineered.rows[0].numeric[lag], Some(100.0));
    assert_eq!(engineered.rows[0].numeric[temp], None);
    assert_eq!(engineered.rows[1].numeric[lag], Some(130.0));
}

#[test]
fn test_missing_column_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("air.csv");
    std::fs::write(
        &path,
        "No,year,month,day,hour,pm2.5,TEMP,PRES,cbwd,Iws,Is,Ir\n1,2010,1,1,0,10,-11,1021,NW,1.79,0,0\n",
    )
    .unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, AirqError::MissingColumn(ref c) if c == "DEWP"));
}

#[test]
fn test_missing_file_is_data_error() {
    let err = load_dataset("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, AirqError::DataError(_)));
}

#[test]
fn test_design_matrix_layout() {
    let dataset = airq::data::Dataset::from_observations(synthetic_observations(100, 3)).unwrap();
    let pipeline = FeaturePipeline::default();
    let engineered = pipeline.engineer(&dataset);
    let fitted = pipeline.fit(&engineered.rows).unwrap();
    let x = fitted.transform(&engineered.rows).unwrap();

    assert_eq!(x.nrows(), 99);
    assert_eq!(x.ncols(), 13);
    assert_eq!(
        fitted.feature_names(),
        vec![
            "DEWP", "TEMP", "PRES", "Iws", "Is", "Ir", "hour", "month", "pm2.5_lag1",
            "cbwd_NE", "cbwd_NW", "cbwd_SE", "cbwd_SW",
        ]
    );
    // exactly one wind column set per row
    for row in x.rows() {
        assert_eq!(row.slice(ndarray::s![9..]).sum(), 1.0);
    }
}

#[test]
fn test_serving_encoding_matches_training_encoding() {
    let dataset = airq::data::Dataset::from_observations(synthetic_observations(60, 5)).unwrap();
    let pipeline = FeaturePipeline::default();
    let engineered = pipeline.engineer(&dataset);
    let fitted = pipeline.fit(&engineered.rows).unwrap();
    let training_x = fitted.transform(&engineered.rows).unwrap();

    let schema = FeatureSchema::air_quality();
    let row = &engineered.rows[7];
    let value = |name: &str| row.numeric[schema.numeric_index(name).unwrap()].unwrap();
    let request = json!({
        "DEWP": value("DEWP"),
        "TEMP": value("TEMP").to_string(),
        "PRES": value("PRES"),
        "Iws": value("Iws"),
        "Is": value("Is"),
        "Ir": value("Ir"),
        "cbwd": row.categorical[0].clone().unwrap(),
        "hour": value("hour") as i64,
        "month": value("month") as i64,
        "pm2_5_lag1": value(LAG_FEATURE),
    });

    let request = PredictionRequest::from_json(&request).unwrap();
    let serving_x = fitted.transform_row(&request.to_feature_row()).unwrap();
    assert_eq!(serving_x, training_x.row(7));
}
