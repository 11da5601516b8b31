//! Semantic validation for parsed pipeline configuration values.

use tabflow_types::{ComponentConfig, EtlError, PipelineConfig, Result};

const LOGGING_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

fn validate_component(section: &ComponentConfig, context: &str, errors: &mut Vec<String>) {
    if section.type_name.trim().is_empty() {
        errors.push(format!("{context}: type must not be empty"));
    }
    if section.name.trim().is_empty() {
        errors.push(format!("{context}: name must not be empty"));
    }
}

/// Validate a parsed pipeline configuration.
///
/// Type-specific fields are checked later by the component constructors;
/// this pass only covers the document-level invariants.
///
/// # Errors
///
/// Returns an error listing all validation failures found.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.app_name.trim().is_empty() {
        errors.push("app_name must not be empty".to_string());
    }

    let level = config.meta.logging_level.to_lowercase();
    if !LOGGING_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "meta.logging_level '{}' is not one of {}",
            config.meta.logging_level,
            LOGGING_LEVELS.join("|")
        ));
    }

    validate_component(&config.extract, "extract", &mut errors);
    validate_component(&config.transformer, "transformer", &mut errors);
    validate_component(&config.storage, "storage", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(EtlError::Config(format!(
            "pipeline validation failed:\n  - {}",
            errors.join("\n  - ")
        )))
    }
}
