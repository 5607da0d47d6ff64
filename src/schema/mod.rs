//! Feature schema shared by training and serving
//!
//! The schema is the single definition of which inputs the model consumes,
//! in which order, and how each one is typed. The feature pipeline builds its
//! design matrix columns from it and the inference service validates requests
//! against it, so the two sides cannot drift apart.

use serde::{Deserialize, Serialize};

/// Name of the regression target column in the raw table
pub const TARGET_COLUMN: &str = "pm2.5";

/// Name of the lag feature (previous hour's target)
pub const LAG_FEATURE: &str = "pm2.5_lag1";

/// Columns that must be present in the raw training table
pub const RAW_COLUMNS: [&str; 12] = [
    "year", "month", "day", "hour", TARGET_COLUMN, "DEWP", "TEMP", "PRES", "cbwd", "Iws", "Is", "Ir",
];

/// How a feature is typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Real-valued input, passed through after imputation
    Numeric,
    /// Integer-valued input, encoded as a number
    Integer,
    /// String-valued input, one-hot encoded over the training vocabulary
    Categorical,
}

impl FeatureKind {
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureKind::Categorical)
    }
}

/// Where a feature value comes from when building training rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSource {
    /// A measured field of the observation
    Measurement,
    /// Derived from the observation timestamp
    Timestamp,
    /// Target of the chronologically preceding observation
    Lag,
}

/// Definition of a single input feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Feature name as used in the design matrix and importances
    pub name: &'static str,
    /// Field name in a prediction request
    pub request_field: &'static str,
    pub kind: FeatureKind,
    pub source: FeatureSource,
}

const fn spec(
    name: &'static str,
    request_field: &'static str,
    kind: FeatureKind,
    source: FeatureSource,
) -> FeatureSpec {
    FeatureSpec { name, request_field, kind, source }
}

static AIR_QUALITY_FEATURES: [FeatureSpec; 10] = [
    spec("DEWP", "DEWP", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("TEMP", "TEMP", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("PRES", "PRES", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("Iws", "Iws", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("Is", "Is", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("Ir", "Ir", FeatureKind::Numeric, FeatureSource::Measurement),
    spec("cbwd", "cbwd", FeatureKind::Categorical, FeatureSource::Measurement),
    spec("hour", "hour", FeatureKind::Integer, FeatureSource::Timestamp),
    spec("month", "month", FeatureKind::Integer, FeatureSource::Timestamp),
    spec(LAG_FEATURE, "pm2_5_lag1", FeatureKind::Numeric, FeatureSource::Lag),
];

/// Canonical set of input features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    features: &'static [FeatureSpec],
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::air_quality()
    }
}

impl FeatureSchema {
    /// The PM2.5 schema: six meteorological measurements, wind direction,
    /// hour, month and the previous hour's PM2.5 reading.
    pub fn air_quality() -> Self {
        Self { features: &AIR_QUALITY_FEATURES }
    }

    /// All features in declaration order
    pub fn features(&self) -> &'static [FeatureSpec] {
        self.features
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<&'static FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Non-categorical features, in the order they appear in the design matrix
    pub fn numeric(&self) -> impl Iterator<Item = &'static FeatureSpec> {
        self.features.iter().filter(|f| !f.kind.is_categorical())
    }

    /// Categorical features, in the order their one-hot blocks appear
    pub fn categorical(&self) -> impl Iterator<Item = &'static FeatureSpec> {
        self.features.iter().filter(|f| f.kind.is_categorical())
    }

    pub fn numeric_names(&self) -> Vec<&'static str> {
        self.numeric().map(|f| f.name).collect()
    }

    pub fn n_numeric(&self) -> usize {
        self.numeric().count()
    }

    /// Position of a numeric feature within the numeric block
    pub fn numeric_index(&self, name: &str) -> Option<usize> {
        self.numeric().position(|f| f.name == name)
    }

    /// Name of the one-hot column for `category` of categorical feature `feature`
    pub fn expanded_name(feature: &str, category: &str) -> String {
        format!("{}_{}", feature, category)
    }
}
