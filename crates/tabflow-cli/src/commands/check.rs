use std::path::Path;

use tabflow_engine::config::{parser, validator};
use tabflow_engine::orchestrator;
use tabflow_types::Result;

use crate::logging;

/// Execute the `check` command: parse, validate, and assemble all
/// components without touching any data.
pub fn execute(config_path: &Path, log_level: Option<&str>) -> Result<()> {
    let config = parser::parse_pipeline(config_path)?;
    logging::init(log_level.unwrap_or(&config.meta.logging_level));

    validator::validate_pipeline(&config)?;
    orchestrator::check_pipeline(&config)?;

    println!(
        "Pipeline '{}' is valid: all components resolved.",
        config.app_name
    );
    Ok(())
}
