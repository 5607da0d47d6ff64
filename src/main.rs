//! airq - Main Entry Point
//!
//! Train the PM2.5 model, serve predictions, or inspect a saved artifact.

use airq::cli::{cmd_info, cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airq=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { paths, training } => {
            cmd_train(&paths, &training)?;
        }
        Commands::Serve { paths, training, port, host } => {
            cmd_serve(&paths, &training, &host, port).await?;
        }
        Commands::Predict { artifact_dir, request } => {
            cmd_predict(&artifact_dir, &request)?;
        }
        Commands::Info { artifact_dir } => {
            cmd_info(&artifact_dir)?;
        }
    }

    Ok(())
}
