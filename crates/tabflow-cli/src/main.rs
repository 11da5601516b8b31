mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tabflow",
    version,
    about = "Configuration-driven batch ETL runner for tabular files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level override (error, warn, info, debug, trace); defaults to
    /// the pipeline's meta.logging_level
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an ETL pipeline
    Run {
        /// Path to pipeline YAML file
        config: PathBuf,
    },
    /// Validate a pipeline configuration without extracting
    Check {
        /// Path to pipeline YAML file
        config: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config } => commands::run::execute(&config, cli.log_level.as_deref()).await,
        Commands::Check { config } => commands::check::execute(&config, cli.log_level.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The subscriber may not be up if config loading failed, so
            // the error also goes to stderr directly.
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
