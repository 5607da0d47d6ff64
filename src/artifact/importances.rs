//! Feature importances keyed by expanded feature name

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered mapping of expanded feature name to importance weight.
///
/// Entries keep design-matrix column order; on disk this is a JSON object
/// whose keys appear in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureImportances {
    entries: Vec<(String, f64)>,
}

impl FeatureImportances {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Pair column names with weights
    pub fn from_columns(names: Vec<String>, weights: impl IntoIterator<Item = f64>) -> Self {
        Self::new(names.into_iter().zip(weights).collect())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, w)| (n.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Entries sorted by descending weight
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Serialize for FeatureImportances {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, weight) in &self.entries {
            map.serialize_entry(name, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureImportances {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ImportancesVisitor;

        impl<'de> Visitor<'de> for ImportancesVisitor {
            type Value = FeatureImportances;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature name to importance")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, weight)) = access.next_entry::<String, f64>()? {
                    entries.push((name, weight));
                }
                Ok(FeatureImportances { entries })
            }
        }

        deserializer.deserialize_map(ImportancesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_column_order() {
        let imp = FeatureImportances::from_columns(
            vec!["TEMP".into(), "DEWP".into(), "cbwd_NE".into()],
            vec![0.5, 0.3, 0.2],
        );
        let json = serde_json::to_string(&imp).unwrap();
        assert_eq!(json, r#"{"TEMP":0.5,"DEWP":0.3,"cbwd_NE":0.2}"#);

        let back: FeatureImportances = serde_json::from_str(&json).unwrap();
        assert_eq!(back, imp);
        assert_eq!(back.get("DEWP"), Some(0.3));
    }

    #[test]
    fn test_ranked() {
        let imp = FeatureImportances::new(vec![("a".into(), 0.1), ("b".into(), 0.9)]);
        assert_eq!(imp.ranked()[0], ("b", 0.9));
        assert!((imp.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_map() {
        assert!(serde_json::from_str::<FeatureImportances>("[1, 2]").is_err());
    }
}
