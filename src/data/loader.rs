//! Training table loading

use super::{Dataset, RawRecord, MEASUREMENT_COLUMNS};
use crate::error::{AirqError, Result};
use crate::schema::{RAW_COLUMNS, TARGET_COLUMN};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Marker used for missing values in the training CSV
const NA_MARKER: &str = "NA";

/// Load the training CSV into raw records
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AirqError::DataError(format!(
            "training data not found: {}",
            path.display()
        )));
    }

    let start = Instant::now();
    let parse_options = CsvParseOptions::default()
        .with_null_values(Some(NullValues::AllColumnsSingle(NA_MARKER.into())));

    // every column is read as text; typing happens in the non-strict casts below
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Training table loaded"
    );

    records_from_frame(&df)
}

/// Load the training CSV and build a cleaned, time-ordered dataset
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    Dataset::from_records(load_csv(path)?)
}

/// Convert a data frame with the raw training columns into records.
///
/// Numeric columns are cast non-strictly, so cells that do not parse as
/// numbers become missing values rather than errors.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>> {
    for name in RAW_COLUMNS {
        if df.column(name).is_err() {
            return Err(AirqError::MissingColumn(name.to_string()));
        }
    }
    if df.height() == 0 {
        return Err(AirqError::DataError("training table has no rows".to_string()));
    }

    let year = int_column(df, "year")?;
    let month = int_column(df, "month")?;
    let day = int_column(df, "day")?;
    let hour = int_column(df, "hour")?;
    let pm25 = float_column(df, TARGET_COLUMN)?;
    let cbwd = string_column(df, "cbwd")?;
    let measurements = MEASUREMENT_COLUMNS
        .iter()
        .map(|name| float_column(df, name))
        .collect::<Result<Vec<_>>>()?;

    let records = (0..df.height())
        .map(|i| {
            let mut values = [None; 6];
            for (slot, column) in values.iter_mut().zip(&measurements) {
                *slot = column[i];
            }
            RawRecord {
                year: year[i],
                month: month[i],
                day: day[i],
                hour: hour[i],
                pm25: pm25[i],
                measurements: values,
                cbwd: cbwd[i].clone(),
            }
        })
        .collect();

    Ok(records)
}

fn materialized(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| AirqError::MissingColumn(name.to_string()))?;
    Ok(column.as_materialized_series().clone())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = materialized(df, name)?.cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = materialized(df, name)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = materialized(df, name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}
