//! Extraction stage: contract, registry, and the run decorator.

pub mod files;
mod filter;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::timing::format_elapsed;
use crate::transform::TransformStage;
use tabflow_types::{ComponentConfig, ComponentRole, EtlError, Result};

/// Counters from one extraction call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractSummary {
    /// Files that survived filtering and were read.
    pub files_extracted: usize,
    /// Downstream transform invocations.
    pub datasets_forwarded: u64,
    /// Total rows across all forwarded datasets.
    pub rows_forwarded: u64,
}

/// Head of the pipeline: lists, filters, reads, and forwards source data
/// to the transform chain.
#[async_trait]
pub trait Extract: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// One extraction pass over the configured source.
    async fn extract(&self) -> Result<ExtractSummary>;
}

/// Timing/logging decorator around one extraction call. Warns when
/// nothing was forwarded downstream.
pub async fn run_extractor(extractor: &dyn Extract) -> Result<ExtractSummary> {
    let start = Instant::now();
    let summary = extractor.extract().await?;
    tracing::info!(
        "extractor [{}] completed in {}",
        extractor.name(),
        format_elapsed(start.elapsed())
    );
    if summary.datasets_forwarded == 0 {
        tracing::warn!("process terminated: no data found to proceed");
    }
    Ok(summary)
}

type ExtractorCtor = fn(&ComponentConfig, Arc<TransformStage>) -> Result<Box<dyn Extract>>;

/// Registered extractor types.
static EXTRACTORS: &[(&str, ExtractorCtor)] =
    &[("csv_file", files::CsvFileExtractor::from_config)];

/// Look up `config.type` and build the extraction stage around its
/// downstream transformer.
///
/// # Errors
///
/// Returns [`EtlError::UnknownComponentType`] on a registry miss, or a
/// configuration error from the selected constructor.
pub fn create_extractor(
    config: &ComponentConfig,
    transformer: Arc<TransformStage>,
) -> Result<Box<dyn Extract>> {
    let ctor = EXTRACTORS
        .iter()
        .find(|(type_name, _)| *type_name == config.type_name)
        .map(|(_, ctor)| ctor)
        .ok_or_else(|| EtlError::UnknownComponentType {
            role: ComponentRole::Extractor,
            type_name: config.type_name.clone(),
        })?;
    let extractor = ctor(config, transformer)?;
    tracing::info!(component = %config.name, "created extractor [{}]", config.type_name);
    Ok(extractor)
}
