//! Mean imputation for numeric features

use crate::error::{AirqError, Result};
use serde::{Deserialize, Serialize};

/// Replaces missing numeric values with the training mean of their feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    names: Vec<String>,
    means: Vec<f64>,
}

impl MeanImputer {
    /// Compute per-feature means over non-missing values.
    ///
    /// Each row holds one value per entry of `names`, in the same order. A
    /// feature with no non-missing value fails with [`AirqError::EmptyFeature`].
    pub fn fit<'a, I>(names: &[&str], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [Option<f64>]>,
    {
        let n = names.len();
        let mut sums = vec![0.0f64; n];
        let mut counts = vec![0usize; n];

        for row in rows {
            if row.len() != n {
                return Err(AirqError::ShapeError {
                    expected: format!("{} numeric values", n),
                    actual: format!("{} numeric values", row.len()),
                });
            }
            for (j, value) in row.iter().enumerate() {
                if let Some(v) = value {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }

        let means = names
            .iter()
            .enumerate()
            .map(|(j, name)| {
                if counts[j] == 0 {
                    Err(AirqError::EmptyFeature(name.to_string()))
                } else {
                    Ok(sums[j] / counts[j] as f64)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            means,
        })
    }

    /// Fill value for feature `j`
    pub fn mean(&self, j: usize) -> f64 {
        self.means[j]
    }

    /// Fill value for a feature by name
    pub fn mean_of(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|j| self.means[j])
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Impute one row into `out`
    pub fn transform_into(&self, row: &[Option<f64>], out: &mut [f64]) -> Result<()> {
        if row.len() != self.means.len() || out.len() != self.means.len() {
            return Err(AirqError::ShapeError {
                expected: format!("{} numeric values", self.means.len()),
                actual: format!("{} numeric values", row.len()),
            });
        }
        for ((slot, value), mean) in out.iter_mut().zip(row).zip(&self.means) {
            *slot = value.unwrap_or(*mean);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_over_non_missing() {
        let rows: Vec<Vec<Option<f64>>> = vec![
            vec![Some(1.0), Some(10.0)],
            vec![None, Some(20.0)],
            vec![Some(3.0), Some(30.0)],
        ];
        let imputer = MeanImputer::fit(&["a", "b"], rows.iter().map(|r| r.as_slice())).unwrap();
        assert_eq!(imputer.means(), &[2.0, 20.0]);
        assert_eq!(imputer.mean_of("b"), Some(20.0));

        let mut out = [0.0; 2];
        imputer.transform_into(&rows[1], &mut out).unwrap();
        assert_eq!(out, [2.0, 20.0]);
    }

    #[test]
    fn test_empty_feature() {
        let rows: Vec<Vec<Option<f64>>> = vec![vec![Some(1.0), None], vec![Some(2.0), None]];
        let err = MeanImputer::fit(&["a", "b"], rows.iter().map(|r| r.as_slice())).unwrap_err();
        assert!(matches!(err, AirqError::EmptyFeature(ref name) if name == "b"));
    }

    #[test]
    fn test_shape_mismatch() {
        let rows: Vec<Vec<Option<f64>>> = vec![vec![Some(1.0)]];
        let imputer = MeanImputer::fit(&["a"], rows.iter().map(|r| r.as_slice())).unwrap();
        let mut out = [0.0; 1];
        assert!(imputer.transform_into(&[Some(1.0), Some(2.0)], &mut out).is_err());
    }
}
