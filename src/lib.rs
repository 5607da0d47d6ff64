//! airq - PM2.5 forecasting from hourly meteorological observations
//!
//! This crate trains a random forest regressor on hourly air quality
//! readings and serves single predictions from the persisted model:
//! - Time-ordered data loading with a causal one-hour lag feature
//! - A feature pipeline whose fitted parameters are frozen into the artifact
//! - Grid search scored by k-fold cross-validation
//! - Atomic artifact persistence and hot reload
//! - HTTP server and CLI interfaces
//!
//! # Modules
//!
//! ## Core pipeline
//! - [`schema`] - Canonical feature definitions shared by training and serving
//! - [`data`] - CSV loading and cleaned, time-ordered datasets
//! - [`preprocessing`] - Lag construction, imputation, one-hot encoding
//! - [`training`] - Trees, forests, cross-validation and the trainer
//! - [`artifact`] - The persisted model bundle
//! - [`inference`] - Request validation and prediction
//!
//! ## Services
//! - [`startup`] - Load-or-train before serving
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Core pipeline
pub mod schema;
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod artifact;
pub mod inference;

// Services
pub mod startup;
pub mod server;
pub mod cli;

pub use error::{AirqError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{AirqError, ErrorCategory, Result};

    // Configuration
    pub use crate::config::ArtifactConfig;

    // Data
    pub use crate::data::{load_dataset, Dataset, Observation};
    pub use crate::schema::FeatureSchema;

    // Preprocessing
    pub use crate::preprocessing::{FeaturePipeline, FeatureRow, FittedTransform};

    // Training
    pub use crate::training::{
        EvaluationReport, ForestParams, HyperparameterGrid, ModelTrainer, RandomForestRegressor,
        TrainingConfig,
    };

    // Artifact
    pub use crate::artifact::{ArtifactMetrics, FeatureImportances, ModelArtifact};

    // Inference
    pub use crate::inference::{InferenceService, PredictionRequest, PredictionResponse};
}
