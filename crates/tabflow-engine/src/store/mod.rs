//! Storage stage: terminal sink contract, registry, and run decorator.

pub mod files;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::timing::format_elapsed;
use tabflow_types::{ComponentConfig, ComponentRole, Dataset, EtlError, Result};

/// Terminal sink: persists a finished dataset.
#[async_trait]
pub trait Store: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Write `data` to the configured sink. Backend errors propagate
    /// unmodified; nothing is retried.
    async fn store(&self, data: &Dataset) -> Result<()>;
}

/// Timing/logging decorator around a single store call.
pub async fn run_storage(storage: &dyn Store, data: &Dataset) -> Result<()> {
    let start = Instant::now();
    storage.store(data).await?;
    tracing::info!(
        "storage [{}] completed in {}",
        storage.name(),
        format_elapsed(start.elapsed())
    );
    Ok(())
}

type StorageCtor = fn(&ComponentConfig) -> Result<Arc<dyn Store>>;

/// Registered storage types. New sink variants plug in here without
/// touching the orchestration logic.
static STORAGES: &[(&str, StorageCtor)] = &[("csv_file", files::CsvStorage::from_config)];

/// Look up `config.type` and build the storage stage.
///
/// # Errors
///
/// Returns [`EtlError::UnknownComponentType`] on a registry miss, or a
/// configuration error from the selected constructor.
pub fn create_storage(config: &ComponentConfig) -> Result<Arc<dyn Store>> {
    let ctor = STORAGES
        .iter()
        .find(|(type_name, _)| *type_name == config.type_name)
        .map(|(_, ctor)| ctor)
        .ok_or_else(|| EtlError::UnknownComponentType {
            role: ComponentRole::Storage,
            type_name: config.type_name.clone(),
        })?;
    let storage = ctor(config)?;
    tracing::info!(component = %config.name, "created storage [{}]", config.type_name);
    Ok(storage)
}
