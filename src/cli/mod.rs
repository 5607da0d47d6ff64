//! airq CLI Module
//!
//! Command-line interface for training, serving and one-off predictions.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::artifact::{ArtifactMetrics, FeatureImportances, ModelArtifact};
use crate::config::ArtifactConfig;
use crate::inference::{InferenceService, PredictionRequest};
use crate::server::{run_server, AppState, ServerConfig};
use crate::startup::{load_or_train, train_and_save, ArtifactOrigin};
use crate::training::{EvaluationReport, HoldoutStrategy, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "airq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PM2.5 forecasting: train a random forest and serve predictions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where data and artifacts live
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Training data CSV
    #[arg(long, env = "DATA_PATH", default_value = crate::config::DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Artifact directory
    #[arg(long, env = "ARTIFACT_DIR", default_value = crate::config::DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: PathBuf,
}

impl PathArgs {
    pub fn to_config(&self) -> ArtifactConfig {
        ArtifactConfig::new(&self.artifact_dir, &self.data)
    }
}

/// Training knobs shared by `train` and `serve`
#[derive(Args, Debug, Clone)]
pub struct TrainingArgs {
    /// Number of cross-validation folds
    #[arg(long, default_value = "3")]
    pub cv_folds: usize,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Worker threads for the grid search
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Hold out the most recent rows instead of a random sample
    #[arg(long)]
    pub chronological: bool,

    /// Shuffle rows before assigning cross-validation folds
    #[arg(long)]
    pub shuffle_folds: bool,
}

impl TrainingArgs {
    pub fn to_config(&self) -> TrainingConfig {
        let holdout = if self.chronological {
            HoldoutStrategy::Chronological
        } else {
            HoldoutStrategy::Shuffled
        };
        TrainingConfig::default()
            .with_cv_folds(self.cv_folds)
            .with_test_fraction(self.test_fraction)
            .with_random_state(self.seed)
            .with_n_jobs(self.jobs)
            .with_holdout(holdout)
            .with_shuffle_folds(self.shuffle_folds)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model and save the artifact
    Train {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Load the saved model (training one if absent) and start the server
    Serve {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        training: TrainingArgs,

        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "5000")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,
    },

    /// Predict from a JSON request using the saved model
    Predict {
        /// Artifact directory
        #[arg(long, env = "ARTIFACT_DIR", default_value = crate::config::DEFAULT_ARTIFACT_DIR)]
        artifact_dir: PathBuf,

        /// JSON object, or @path to a file holding one
        #[arg(short, long)]
        request: String,
    },

    /// Show metrics and feature importances of the saved model
    Info {
        /// Artifact directory
        #[arg(long, env = "ARTIFACT_DIR", default_value = crate::config::DEFAULT_ARTIFACT_DIR)]
        artifact_dir: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(paths: &PathArgs, training: &TrainingArgs) -> anyhow::Result<()> {
    section("Train");

    step_run(&format!("Training from {}", paths.data.display().to_string().cyan()));
    let start = Instant::now();
    let (_, report) = train_and_save(&paths.to_config(), &training.to_config())?;
    step_done(&format!("{:?}", start.elapsed()));
    step_ok(&format!("Artifact saved to {}", paths.artifact_dir.display()));

    print_report(&report);
    Ok(())
}

pub fn cmd_predict(artifact_dir: &Path, request: &str) -> anyhow::Result<()> {
    section("Predict");

    let body = match request.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => request.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&body)?;
    let request = PredictionRequest::from_json(&value)?;

    let artifact = ModelArtifact::load(artifact_dir)?;
    let prediction = crate::inference::predict(&artifact, &request)?;

    println!();
    println!("  {:<16} {}", muted("PM2.5"), format!("{} μg/m³", prediction).white().bold());
    println!();
    Ok(())
}

pub fn cmd_info(artifact_dir: &Path) -> anyhow::Result<()> {
    section("Model");

    let metrics = ArtifactMetrics::load(artifact_dir)?;
    let importances = FeatureImportances::load(artifact_dir)?;

    println!("  {:<16} {}", muted("R²"), format!("{:.4}", metrics.r2_score).white().bold());
    println!("  {:<16} {}", muted("RMSE"), format!("{:.4}", metrics.rmse).white());
    println!("  {:<16} {}", muted("MAE"), format!("{:.4}", metrics.mae).white());
    println!("  {:<16} {}", muted("Params"), metrics.best_params.to_string().white());

    section("Feature importances");
    for (name, weight) in importances.ranked() {
        let bar = "█".repeat((weight * 40.0).round() as usize);
        println!("  {:<16} {:>7.4} {}", muted(name), weight, accent(&bar));
    }
    println!();
    Ok(())
}

pub async fn cmd_serve(
    paths: &PathArgs,
    training: &TrainingArgs,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let artifact_config = paths.to_config();
    let training_config = training.to_config();

    step_run("Preparing model");
    let start = Instant::now();
    let (artifact, origin) =
        tokio::task::spawn_blocking(move || load_or_train(&artifact_config, &training_config)).await??;
    match &origin {
        ArtifactOrigin::Loaded => step_done(&format!("loaded in {:?}", start.elapsed())),
        ArtifactOrigin::Trained(report) => {
            step_done(&format!("trained in {:?}", start.elapsed()));
            print_report(report);
        }
    }

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "airq".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("http://{}:{}/predict", host, port)));
    line_box(&kv("Metrics", &format!("http://{}:{}/api/metrics", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig::default()
        .with_host(host)
        .with_port(port)
        .with_artifact_dir(&paths.artifact_dir);
    let state = Arc::new(AppState::new(config, InferenceService::with_artifact(artifact)));

    run_server(state).await
}

fn print_report(report: &EvaluationReport) {
    println!();
    println!("  {:<16} {}", muted("R²"), format!("{:.4}", report.test_metrics.r2).white().bold());
    println!("  {:<16} {}", muted("RMSE"), format!("{:.4}", report.test_metrics.rmse).white());
    println!("  {:<16} {}", muted("MAE"), format!("{:.4}", report.test_metrics.mae).white());
    println!("  {:<16} {}", muted("CV R²"), format!("{:.4}", report.best_cv_score).white());
    println!("  {:<16} {}", muted("Params"), report.best_params.to_string().white());
    println!(
        "  {:<16} {}",
        muted("Rows"),
        format!("{} train / {} test", report.n_train, report.n_test).white()
    );
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", report.training_time_secs).white());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "hi".red());
        assert_eq!(strip_ansi(&colored), "hi");
    }

    #[test]
    fn test_parse_train_args() {
        let cli = Cli::try_parse_from([
            "airq", "train", "--data", "d.csv", "--artifact-dir", "out", "--cv-folds", "5", "--chronological",
        ])
        .unwrap();
        match cli.command {
            Commands::Train { paths, training } => {
                assert_eq!(paths.data, PathBuf::from("d.csv"));
                let config = training.to_config();
                assert_eq!(config.cv_folds, 5);
                assert_eq!(config.holdout, HoldoutStrategy::Chronological);
                assert_eq!(config.random_state, 42);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_predict_args() {
        let cli = Cli::try_parse_from(["airq", "predict", "--artifact-dir", "a", "-r", "{}"]).unwrap();
        assert!(matches!(cli.command, Commands::Predict { ref request, .. } if request == "{}"));
    }
}
