//! One-hot encoding with a frozen vocabulary

use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for a single categorical feature.
///
/// Values outside the training vocabulary, and missing values, encode to the
/// all-zero vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    feature: String,
    /// Sorted distinct training values; position = one-hot column
    vocabulary: Vec<String>,
}

impl OneHotEncoder {
    /// Collect the distinct non-missing values seen in training
    pub fn fit<'a, I>(feature: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let vocabulary: BTreeSet<&str> = values.into_iter().flatten().collect();
        Self {
            feature: feature.to_string(),
            vocabulary: vocabulary.into_iter().map(str::to_string).collect(),
        }
    }

    /// Build an encoder from an explicit vocabulary
    pub fn with_vocabulary(feature: &str, vocabulary: &[&str]) -> Self {
        Self::fit(feature, vocabulary.iter().map(|v| Some(*v)))
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Width of the one-hot block
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Position of a category, `None` if unknown
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|v| v.as_str().cmp(value))
            .ok()
    }

    /// Write the one-hot block for `value` into `out` (which must be `width()` long)
    pub fn encode_into(&self, value: Option<&str>, out: &mut [f64]) {
        out.iter_mut().for_each(|v| *v = 0.0);
        if let Some(idx) = value.and_then(|v| self.index_of(v)) {
            out[idx] = 1.0;
        }
    }

    /// Names of the one-hot columns, e.g. `cbwd_NE`
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary
            .iter()
            .map(|v| FeatureSchema::expanded_name(&self.feature, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_sorted_and_distinct() {
        let enc = OneHotEncoder::fit(
            "cbwd",
            vec![Some("SE"), Some("NW"), None, Some("cv"), Some("NW"), Some("NE")],
        );
        assert_eq!(enc.vocabulary(), &["NE", "NW", "SE", "cv"]);
        assert_eq!(
            enc.feature_names(),
            vec!["cbwd_NE", "cbwd_NW", "cbwd_SE", "cbwd_cv"]
        );
    }

    #[test]
    fn test_encode_known_and_unknown() {
        let enc = OneHotEncoder::with_vocabulary("cbwd", &["NW", "NE", "SW", "SE"]);
        let mut out = vec![9.0; enc.width()];

        enc.encode_into(Some("SE"), &mut out);
        assert_eq!(out, vec![0.0, 0.0, 1.0, 0.0]);

        enc.encode_into(Some("cv"), &mut out);
        assert_eq!(out, vec![0.0; 4]);

        enc.encode_into(None, &mut out);
        assert_eq!(out, vec![0.0; 4]);
    }
}
