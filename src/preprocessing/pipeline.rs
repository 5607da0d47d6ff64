//! Fit/transform pipeline producing the design matrix

use super::{build_feature_rows, EngineeredDataset, FeatureRow, MeanImputer, OneHotEncoder};
use crate::data::Dataset;
use crate::error::{AirqError, Result};
use crate::schema::FeatureSchema;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Deterministic transform from raw observations to model inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct FeaturePipeline {
    schema: FeatureSchema,
}

impl FeaturePipeline {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build lagged feature rows from a time-ordered dataset
    pub fn engineer(&self, dataset: &Dataset) -> EngineeredDataset {
        build_feature_rows(dataset, &self.schema)
    }

    /// Learn imputation means and categorical vocabularies from `rows`
    pub fn fit(&self, rows: &[FeatureRow]) -> Result<FittedTransform> {
        let start = Instant::now();
        if rows.is_empty() {
            return Err(AirqError::DataError(
                "cannot fit feature pipeline on zero rows".to_string(),
            ));
        }

        let numeric_names = self.schema.numeric_names();
        let imputer = MeanImputer::fit(&numeric_names, rows.iter().map(|r| r.numeric.as_slice()))?;

        let encoders = self
            .schema
            .categorical()
            .enumerate()
            .map(|(j, spec)| {
                OneHotEncoder::fit(
                    spec.name,
                    rows.iter().map(|r| r.categorical.get(j).and_then(|v| v.as_deref())),
                )
            })
            .collect::<Vec<_>>();

        let fitted = FittedTransform { imputer, encoders };
        debug!(
            rows = rows.len(),
            n_features = fitted.n_features(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Feature pipeline fitted"
        );
        Ok(fitted)
    }
}

/// Frozen pipeline parameters: imputation means and categorical vocabularies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransform {
    imputer: MeanImputer,
    encoders: Vec<OneHotEncoder>,
}

impl FittedTransform {
    pub fn imputer(&self) -> &MeanImputer {
        &self.imputer
    }

    pub fn encoders(&self) -> &[OneHotEncoder] {
        &self.encoders
    }

    /// Vocabulary of a categorical feature
    pub fn vocabulary(&self, feature: &str) -> Option<&[String]> {
        self.encoders
            .iter()
            .find(|e| e.feature() == feature)
            .map(|e| e.vocabulary())
    }

    /// Number of design-matrix columns
    pub fn n_features(&self) -> usize {
        self.imputer.len() + self.encoders.iter().map(|e| e.width()).sum::<usize>()
    }

    /// Expanded feature names: numeric features, then one column per category
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.imputer.names().to_vec();
        for encoder in &self.encoders {
            names.extend(encoder.feature_names());
        }
        names
    }

    /// Encode a single row
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Array1<f64>> {
        let mut buf = vec![0.0; self.n_features()];
        self.write_row(row, &mut buf)?;
        Ok(Array1::from_vec(buf))
    }

    /// Encode many rows into a design matrix
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Array2<f64>> {
        let width = self.n_features();
        let encoded: Vec<Vec<f64>> = rows
            .par_iter()
            .map(|row| {
                let mut buf = vec![0.0; width];
                self.write_row(row, &mut buf)?;
                Ok(buf)
            })
            .collect::<Result<Vec<_>>>()?;

        let flat: Vec<f64> = encoded.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((rows.len(), width), flat)?)
    }

    fn write_row(&self, row: &FeatureRow, out: &mut [f64]) -> Result<()> {
        if row.categorical.len() != self.encoders.len() {
            return Err(AirqError::ShapeError {
                expected: format!("{} categorical values", self.encoders.len()),
                actual: format!("{} categorical values", row.categorical.len()),
            });
        }

        let n_numeric = self.imputer.len();
        let (numeric_out, mut rest) = out.split_at_mut(n_numeric);
        self.imputer.transform_into(&row.numeric, numeric_out)?;

        for (encoder, value) in self.encoders.iter().zip(&row.categorical) {
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(encoder.width());
            encoder.encode_into(value.as_deref(), block);
            rest = tail;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LAG_FEATURE;

    fn row(temp: Option<f64>, cbwd: Option<&str>) -> FeatureRow {
        let schema = FeatureSchema::air_quality();
        let mut numeric = vec![Some(1.0); schema.n_numeric()];
        numeric[schema.numeric_index("TEMP").unwrap()] = temp;
        FeatureRow::new(numeric, vec![cbwd.map(str::to_string)])
    }

    #[test]
    fn test_feature_names() {
        let pipeline = FeaturePipeline::default();
        let fitted = pipeline
            .fit(&[row(Some(1.0), Some("NW")), row(Some(2.0), Some("SE"))])
            .unwrap();
        let names = fitted.feature_names();
        assert_eq!(names.len(), 11);
        assert_eq!(names[8], LAG_FEATURE);
        assert_eq!(&names[9..], &["cbwd_NW".to_string(), "cbwd_SE".to_string()]);
        assert_eq!(fitted.n_features(), 11);
    }

    #[test]
    fn test_transform_imputes_and_encodes() {
        let pipeline = FeaturePipeline::default();
        let rows = vec![
            row(Some(2.0), Some("NW")),
            row(None, Some("SE")),
            row(Some(4.0), Some("NW")),
        ];
        let fitted = pipeline.fit(&rows).unwrap();
        let x = fitted.transform(&rows).unwrap();
        let temp = FeatureSchema::air_quality().numeric_index("TEMP").unwrap();

        assert_eq!(x.shape(), &[3, 11]);
        assert_eq!(x[[1, temp]], 3.0);
        assert_eq!(x[[0, 9]], 1.0);
        assert_eq!(x[[1, 10]], 1.0);
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let pipeline = FeaturePipeline::default();
        let fitted = pipeline.fit(&[row(Some(1.0), Some("NW"))]).unwrap();
        let encoded = fitted.transform_row(&row(Some(1.0), Some("cv"))).unwrap();
        assert_eq!(encoded[9], 0.0);
        assert_eq!(encoded.len(), 10);
    }

    #[test]
    fn test_fit_empty_fails() {
        assert!(FeaturePipeline::default().fit(&[]).is_err());
    }

    #[test]
    fn test_wrong_width_row() {
        let fitted = FeaturePipeline::default()
            .fit(&[row(Some(1.0), Some("NW"))])
            .unwrap();
        let bad = FeatureRow::new(vec![Some(1.0)], vec![None]);
        assert!(matches!(
            fitted.transform_row(&bad),
            Err(AirqError::ShapeError { .. })
        ));
    }
}
