//! Pipeline assembler: builds Storage → Transform(chain) → Extraction in
//! dependency order from one configuration document, then triggers
//! extraction.

use std::sync::Arc;
use std::time::Instant;

use crate::extract;
use crate::result::PipelineReport;
use crate::store;
use crate::transform;
use tabflow_types::{PipelineConfig, Result};

/// Build all three stages bottom-up and run extraction once.
///
/// # Errors
///
/// Propagates assembly errors (unknown types, bad component options) and
/// any extraction, transform, storage, or ledger failure. Nothing is
/// retried.
pub async fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let start = Instant::now();
    tracing::info!(app = %config.app_name, "initializing etl pipeline");

    let storage = store::create_storage(&config.storage)?;
    let transformer = Arc::new(transform::create_transformer(
        &config.transformer,
        Some(storage),
    )?);
    let extractor = extract::create_extractor(&config.extract, transformer)?;

    let summary = extract::run_extractor(extractor.as_ref()).await?;

    Ok(PipelineReport {
        files_extracted: summary.files_extracted,
        datasets_forwarded: summary.datasets_forwarded,
        rows_forwarded: summary.rows_forwarded,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}

/// Build all three stages without extracting anything. Surfaces unknown
/// component types and bad component options before any data is touched.
///
/// # Errors
///
/// Returns the same assembly errors as [`run_pipeline`].
pub fn check_pipeline(config: &PipelineConfig) -> Result<()> {
    let storage = store::create_storage(&config.storage)?;
    let transformer = Arc::new(transform::create_transformer(
        &config.transformer,
        Some(storage),
    )?);
    let _extractor = extract::create_extractor(&config.extract, transformer)?;
    Ok(())
}
