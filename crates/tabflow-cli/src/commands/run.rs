use std::path::Path;

use tabflow_engine::config::{parser, validator};
use tabflow_engine::orchestrator;
use tabflow_types::Result;

use crate::logging;

/// Execute the `run` command: parse, validate, and run a pipeline.
pub async fn execute(config_path: &Path, log_level: Option<&str>) -> Result<()> {
    // 1. Parse pipeline YAML; the config decides the logging threshold.
    let config = parser::parse_pipeline(config_path)?;
    logging::init(log_level.unwrap_or(&config.meta.logging_level));

    // 2. Validate
    validator::validate_pipeline(&config)?;
    tracing::info!(
        app = %config.app_name,
        extract = %config.extract.name,
        transformer = %config.transformer.name,
        storage = %config.storage.name,
        "pipeline validated"
    );

    // 3. Run
    let report = orchestrator::run_pipeline(&config).await?;

    println!("Pipeline '{}' completed successfully.", config.app_name);
    println!("  Files extracted:    {}", report.files_extracted);
    println!("  Datasets forwarded: {}", report.datasets_forwarded);
    println!("  Rows forwarded:     {}", report.rows_forwarded);
    println!("  Duration:           {:.2}s", report.duration_secs);

    Ok(())
}
