//! Training configuration

use super::cross_validation::HoldoutStrategy;
use super::grid::HyperparameterGrid;
use crate::error::{AirqError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of cross-validation folds on the training partition
    pub cv_folds: usize,
    /// Fraction of engineered rows held out for final evaluation
    pub test_fraction: f64,
    /// Seed for the holdout split, fold shuffling and every forest
    pub random_state: u64,
    /// Candidates searched by cross-validation
    pub grid: HyperparameterGrid,
    /// Shuffle rows before assigning folds
    pub shuffle_folds: bool,
    pub holdout: HoldoutStrategy,
    /// Worker threads for the search (None = rayon default)
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            cv_folds: 3,
            test_fraction: 0.2,
            random_state: 42,
            grid: HyperparameterGrid::default(),
            shuffle_folds: false,
            holdout: HoldoutStrategy::Shuffled,
            n_jobs: None,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_grid(mut self, grid: HyperparameterGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_shuffle_folds(mut self, shuffle: bool) -> Self {
        self.shuffle_folds = shuffle;
        self
    }

    pub fn with_holdout(mut self, holdout: HoldoutStrategy) -> Self {
        self.holdout = holdout;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cv_folds < 2 {
            return Err(AirqError::ConfigError(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AirqError::ConfigError(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(AirqError::ConfigError("n_jobs must be at least 1".to_string()));
        }
        self.grid.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.random_state, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(TrainingConfig::new().with_cv_folds(1).validate().is_err());
        assert!(TrainingConfig::new().with_test_fraction(1.0).validate().is_err());
        assert!(TrainingConfig::new().with_n_jobs(Some(0)).validate().is_err());
    }
}
