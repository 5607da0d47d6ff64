//! Hyperparameter grid for the forest search

use crate::error::{AirqError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self
            .max_depth
            .map_or_else(|| "None".to_string(), |d| d.to_string());
        write!(
            f,
            "n_estimators={}, max_depth={}, min_samples_split={}",
            self.n_estimators, depth, self.min_samples_split
        )
    }
}

/// Cartesian grid of forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 150],
            max_depth: vec![Some(10), Some(20), None],
            min_samples_split: vec![2, 5],
        }
    }
}

impl HyperparameterGrid {
    pub fn new(
        n_estimators: Vec<usize>,
        max_depth: Vec<Option<usize>>,
        min_samples_split: Vec<usize>,
    ) -> Self {
        Self {
            n_estimators,
            max_depth,
            min_samples_split,
        }
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.n_estimators.len() * self.max_depth.len() * self.min_samples_split.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate candidates: `max_depth` varies slowest, `n_estimators` fastest.
    /// Ties in cross-validation score resolve to the earliest candidate in
    /// this order.
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &min_samples_split in &self.min_samples_split {
                for &n_estimators in &self.n_estimators {
                    out.push(ForestParams {
                        n_estimators,
                        max_depth,
                        min_samples_split,
                    });
                }
            }
        }
        out
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(AirqError::ConfigError(
                "hyperparameter grid has no candidates".to_string(),
            ));
        }
        if self.n_estimators.contains(&0) {
            return Err(AirqError::ConfigError(
                "n_estimators values must be at least 1".to_string(),
            ));
        }
        if self.max_depth.contains(&Some(0)) {
            return Err(AirqError::ConfigError(
                "max_depth values must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split.iter().any(|&m| m < 2) {
            return Err(AirqError::ConfigError(
                "min_samples_split values must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
