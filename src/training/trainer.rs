//! Grid-searched forest training
//!
//! [`ModelTrainer::train`] runs the full offline pipeline:
//!
//! 1. engineer lagged feature rows from the time-ordered dataset
//! 2. hold out a test partition
//! 3. score every grid candidate with k-fold cross-validation on the
//!    training partition, refitting the feature transform inside each fold
//! 4. refit the transform and the best candidate on the whole training partition
//! 5. evaluate on the held-out rows and assemble a [`ModelArtifact`]

use super::config::TrainingConfig;
use super::cross_validation::{train_test_split, CVResults, CVSplit, CrossValidator};
use super::grid::ForestParams;
use super::metrics::{r2_score, RegressionMetrics};
use super::random_forest::RandomForestRegressor;
use crate::artifact::{ArtifactMetrics, FeatureImportances, ModelArtifact};
use crate::data::Dataset;
use crate::error::{AirqError, ErrorCategory, Result};
use crate::preprocessing::{EngineeredDataset, FeaturePipeline, FittedTransform};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Cross-validation outcome for one grid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: ForestParams,
    pub cv: CVResults,
}

/// Everything measured during a training run, unrounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Metrics on the held-out test partition
    pub test_metrics: RegressionMetrics,
    pub best_params: ForestParams,
    /// Mean cross-validated R² of the selected candidate
    pub best_cv_score: f64,
    /// Every candidate in grid order
    pub candidates: Vec<CandidateResult>,
    pub n_observations: usize,
    /// Rows left after lag construction
    pub n_engineered: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub training_time_secs: f64,
}

/// Trains a random forest over the feature pipeline
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
    pipeline: FeaturePipeline,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            pipeline: FeaturePipeline::default(),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train, select and evaluate a model on `dataset`
    pub fn train(&self, dataset: &Dataset) -> Result<(ModelArtifact, EvaluationReport)> {
        self.config.validate()?;

        match self.config.n_jobs {
            Some(n_jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_jobs)
                    .build()
                    .map_err(|e| AirqError::ConfigError(format!("cannot build thread pool: {}", e)))?;
                pool.install(|| self.run(dataset))
            }
            None => self.run(dataset),
        }
    }

    fn run(&self, dataset: &Dataset) -> Result<(ModelArtifact, EvaluationReport)> {
        let start = Instant::now();
        let cv_folds = self.config.cv_folds;

        let engineered = self.pipeline.engineer(dataset);
        if engineered.len() < cv_folds {
            return Err(AirqError::TrainingError(format!(
                "{} feature rows after lag construction (from {} observations), need at least cv_folds = {}",
                engineered.len(),
                dataset.len(),
                cv_folds
            )));
        }

        let (train_idx, test_idx) = train_test_split(
            engineered.len(),
            self.config.test_fraction,
            self.config.random_state,
            self.config.holdout,
        )
        .map_err(|e| AirqError::TrainingError(e.to_string()))?;

        if train_idx.len() < cv_folds {
            return Err(AirqError::TrainingError(format!(
                "training partition has {} rows, need at least cv_folds = {}",
                train_idx.len(),
                cv_folds
            )));
        }

        let train = engineered.select(&train_idx);
        let test = engineered.select(&test_idx);

        info!(
            observations = dataset.len(),
            feature_rows = engineered.len(),
            train_rows = train.len(),
            test_rows = test.len(),
            candidates = self.config.grid.len(),
            cv_folds,
            "Starting grid search"
        );

        // surface feature-level data problems before the fold loop can wrap them
        self.pipeline.fit(&train.rows)?;

        let candidates = self.search(&train)?;
        let best = select_best(&candidates)
            .ok_or_else(|| AirqError::TrainingError("no candidate produced a finite cross-validation score".to_string()))?;
        let best_params = best.params;
        let best_cv_score = best.cv.mean_score;

        info!(
            best_params = %best_params,
            cv_r2 = best_cv_score,
            "Grid search complete"
        );

        let (transform, model) = self.fit_candidate(&best_params, &train)?;

        let x_test = transform.transform(&test.rows)?;
        let y_pred = model.predict(&x_test)?;
        let test_metrics = RegressionMetrics::compute(&test.target_array(), &y_pred)?;

        let weights = model
            .feature_importances()
            .ok_or(AirqError::ModelNotFitted)?
            .iter()
            .copied();
        let importances = FeatureImportances::from_columns(transform.feature_names(), weights);

        let metrics = ArtifactMetrics::from_evaluation(&test_metrics, best_params);
        let artifact = ModelArtifact::new(transform, model, metrics, importances)?;

        let report = EvaluationReport {
            test_metrics,
            best_params,
            best_cv_score,
            candidates,
            n_observations: dataset.len(),
            n_engineered: engineered.len(),
            n_train: train.len(),
            n_test: test.len(),
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            r2 = test_metrics.r2,
            rmse = test_metrics.rmse,
            mae = test_metrics.mae,
            elapsed_secs = report.training_time_secs,
            "Model trained"
        );

        Ok((artifact, report))
    }

    /// Score every grid candidate by k-fold cross-validation, in grid order
    fn search(&self, train: &EngineeredDataset) -> Result<Vec<CandidateResult>> {
        let folds = CrossValidator::new(self.config.cv_folds)
            .with_shuffle(self.config.shuffle_folds)
            .with_random_state(self.config.random_state)
            .split(train.len())
            .map_err(|e| AirqError::TrainingError(e.to_string()))?;

        self.config
            .grid
            .candidates()
            .into_par_iter()
            .map(|params| {
                let scores = folds
                    .iter()
                    .map(|split| self.score_fold(&params, train, split))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| match e.category() {
                        ErrorCategory::Data => e,
                        _ => AirqError::TrainingError(format!("candidate ({}) failed: {}", params, e)),
                    })?;
                let cv = CVResults::from_scores(scores);
                debug!(
                    params = %params,
                    mean_r2 = cv.mean_score,
                    std_r2 = cv.std_score,
                    "Candidate scored"
                );
                Ok(CandidateResult { params, cv })
            })
            .collect()
    }

    fn score_fold(&self, params: &ForestParams, train: &EngineeredDataset, split: &CVSplit) -> Result<f64> {
        let fold_train = train.select(&split.train_indices);
        let fold_valid = train.select(&split.test_indices);

        let (transform, model) = self.fit_candidate(params, &fold_train)?;
        let x_valid = transform.transform(&fold_valid.rows)?;
        let y_pred = model.predict(&x_valid)?;
        r2_score(&fold_valid.target_array(), &y_pred)
    }

    /// Fit the feature transform and a forest on `rows`
    fn fit_candidate(
        &self,
        params: &ForestParams,
        rows: &EngineeredDataset,
    ) -> Result<(FittedTransform, RandomForestRegressor)> {
        let transform = self.pipeline.fit(&rows.rows)?;
        let x = transform.transform(&rows.rows)?;
        let mut model = RandomForestRegressor::from_params(params, self.config.random_state);
        model.fit(&x, &rows.target_array())?;
        Ok((transform, model))
    }
}

/// First candidate with the highest mean score; NaN scores never win
fn select_best(candidates: &[CandidateResult]) -> Option<&CandidateResult> {
    let mut best: Option<&CandidateResult> = None;
    for candidate in candidates {
        if candidate.cv.mean_score.is_nan() {
            continue;
        }
        if best.map_or(true, |b| candidate.cv.mean_score > b.cv.mean_score) {
            best = Some(candidate);
        }
    }
    best
}
