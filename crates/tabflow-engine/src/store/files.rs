//! CSV file storage: single-file arrow writer or DataFusion sharded
//! directory writer, with deterministic `{key}-{utc timestamp}` naming.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use serde::Deserialize;

use super::Store;
use tabflow_types::{
    ComponentConfig, DataPackage, Dataset, EtlError, Result, StorageBackendKind,
};

const DEFAULT_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S.%f%z";

fn default_time_fmt() -> String {
    DEFAULT_TIME_FMT.to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct CsvStorageParams {
    storage_backend: StorageBackendKind,
    path: PathBuf,
    key: String,
    use_package: DataPackage,
    #[serde(default = "default_time_fmt")]
    time_fmt: String,
}

/// Writes datasets as CSV under the configured sink path.
#[derive(Debug)]
pub(crate) struct CsvStorage {
    name: String,
    params: CsvStorageParams,
}

impl CsvStorage {
    pub(crate) fn from_config(config: &ComponentConfig) -> Result<Arc<dyn Store>> {
        let params: CsvStorageParams = config.params()?;
        Ok(Arc::new(Self {
            name: config.name.clone(),
            params,
        }))
    }

    /// `{path}/{key}-{utc timestamp}` without an extension; the writer
    /// decides whether that becomes a file or a directory.
    fn output_base(&self) -> PathBuf {
        let stamp = Utc::now().format(&self.params.time_fmt).to_string();
        self.params.path.join(format!("{}-{stamp}", self.params.key))
    }

    fn write_arrow(&self, data: &Dataset, base: &Path) -> Result<()> {
        // Timestamps contain dots, so the extension is appended rather
        // than set through Path::with_extension.
        let file_path = PathBuf::from(format!("{}.csv", base.display()));
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(EtlError::backend_write)?;
        }

        let file = File::create(&file_path).map_err(EtlError::backend_write)?;
        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(file);
        for batch in data.batches() {
            writer.write(batch).map_err(EtlError::backend_write)?;
        }
        tracing::info!(component = %self.name, "wrote [{}]", file_path.display());
        Ok(())
    }

    async fn write_datafusion(&self, data: &Dataset, base: &Path) -> Result<()> {
        std::fs::create_dir_all(base).map_err(EtlError::backend_write)?;

        let ctx = SessionContext::new();
        let table = MemTable::try_new(data.schema(), vec![data.batches().to_vec()])
            .map_err(EtlError::backend_write)?;
        let df = ctx
            .read_table(Arc::new(table))
            .map_err(EtlError::backend_write)?;

        // Trailing separator marks a directory target; the backend picks
        // the shard file names.
        let target = format!("{}/", base.display());
        df.write_csv(&target, DataFrameWriteOptions::new(), None)
            .await
            .map_err(EtlError::backend_write)?;
        tracing::info!(component = %self.name, "wrote dataset under [{target}]");
        Ok(())
    }
}

#[async_trait]
impl Store for CsvStorage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn store(&self, data: &Dataset) -> Result<()> {
        match self.params.storage_backend {
            StorageBackendKind::Fs => {}
            other => return Err(EtlError::UnsupportedBackend(other.as_str().to_string())),
        }
        tracing::info!(
            component = %self.name,
            "store files using 'storage_backend' = [fs]"
        );

        let base = self.output_base();
        match self.params.use_package {
            DataPackage::Arrow => self.write_arrow(data, &base),
            DataPackage::Datafusion => self.write_datafusion(data, &base).await,
        }
    }
}
