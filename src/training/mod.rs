//! Model training module
//!
//! Provides the offline half of the pipeline:
//! - Regression trees and a seeded random forest
//! - K-fold cross-validation and holdout splitting
//! - Hyperparameter grid search scored by R²
//! - [`ModelTrainer`], which turns a dataset into a [`crate::artifact::ModelArtifact`]

mod config;
mod grid;
mod metrics;
mod trainer;
pub mod cross_validation;
pub mod decision_tree;
pub mod random_forest;

pub use config::TrainingConfig;
pub use cross_validation::{
    train_test_split, CVResults, CVSplit, CrossValidator, HoldoutStrategy,
};
pub use decision_tree::{DecisionTree, TreeNode};
pub use grid::{ForestParams, HyperparameterGrid};
pub use metrics::{r2_score, RegressionMetrics};
pub use random_forest::RandomForestRegressor;
pub use trainer::{CandidateResult, EvaluationReport, ModelTrainer};
