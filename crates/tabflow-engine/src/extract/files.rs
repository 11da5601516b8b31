//! CSV file extractor: listing, filtering, housekeeping, and reading
//! through the arrow-csv or DataFusion backend.

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{Schema, SchemaRef};
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use serde::Deserialize;

use super::filter;
use super::{Extract, ExtractSummary};
use crate::fs::{EntryKind, Filesystem, LocalFilesystem};
use crate::housekeeping::{HousekeepingLedger, DEFAULT_LEDGER_FILE};
use crate::transform::TransformStage;
use tabflow_types::{
    ComponentConfig, DataPackage, Dataset, EtlError, FilterSpec, ReadMode, Result,
    StorageBackendKind,
};

const FILE_EXT: &str = "csv";
const SCHEMA_INFER_MAX_RECORDS: usize = 100;

fn default_housekeeping() -> String {
    DEFAULT_LEDGER_FILE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct CsvExtractorParams {
    storage_backend: StorageBackendKind,
    path: PathBuf,
    use_package: DataPackage,
    #[serde(default = "default_housekeeping")]
    housekeeping: String,
    #[serde(default)]
    reprocess: bool,
    #[serde(default)]
    fail_no_files: bool,
    #[serde(default)]
    filters: Option<FilterSpec>,
    #[serde(default)]
    read_mode: ReadMode,
}

/// Extracts CSV files from a directory, skipping files already recorded
/// in the housekeeping ledger.
#[derive(Debug)]
pub(crate) struct CsvFileExtractor {
    name: String,
    params: CsvExtractorParams,
    transformer: Arc<TransformStage>,
}

fn basename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl CsvFileExtractor {
    pub(crate) fn from_config(
        config: &ComponentConfig,
        transformer: Arc<TransformStage>,
    ) -> Result<Box<dyn Extract>> {
        let params: CsvExtractorParams = config.params()?;
        Ok(Box::new(Self {
            name: config.name.clone(),
            params,
            transformer,
        }))
    }

    /// List the source directory, apply the filter pipeline, and remove
    /// already-processed files. Newest first throughout.
    fn list_candidates(
        &self,
        fs: &dyn Filesystem,
        ledger: &HousekeepingLedger,
    ) -> Result<Vec<PathBuf>> {
        let mut entries = fs.list(&self.params.path)?;
        entries.sort_by(|a, b| b.modified.cmp(&a.modified));

        // Directories and the ledger itself are never candidates.
        let files: Vec<PathBuf> = entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File && e.basename() != ledger.file_name())
            .map(|e| e.path)
            .collect();
        tracing::info!(
            "retrieved {} file(s) from [{}]",
            files.len(),
            self.params.path.display()
        );

        let filters = self.params.filters.clone().unwrap_or_default();
        let mut files = filter::apply_filters(files, FILE_EXT, &filters);

        if self.params.reprocess {
            tracing::info!("ignore {} file", ledger.file_name());
            tracing::info!(
                "(re)-extracting all {} file(s) from [{}]",
                files.len(),
                self.params.path.display()
            );
        } else {
            let processed = ledger.load(fs)?;
            files.retain(|file| !processed.contains(&basename_of(file)));
            tracing::info!("extract {} file(s) after housekeeping", files.len());
        }

        if files.is_empty() && self.params.fail_no_files {
            return Err(EtlError::NoFilesFound {
                path: self.params.path.display().to_string(),
            });
        }
        Ok(files)
    }

    async fn read(&self, sources: &[PathBuf]) -> Result<Dataset> {
        tracing::info!(
            "extract files using 'package' = [{}]",
            match self.params.use_package {
                DataPackage::Arrow => "arrow",
                DataPackage::Datafusion => "datafusion",
            }
        );
        match self.params.use_package {
            DataPackage::Arrow => read_csv_arrow(sources),
            DataPackage::Datafusion => read_csv_datafusion(sources).await,
        }
    }
}

#[async_trait]
impl Extract for CsvFileExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self) -> Result<ExtractSummary> {
        let fs = match self.params.storage_backend {
            StorageBackendKind::Fs => LocalFilesystem,
            other => return Err(EtlError::UnsupportedBackend(other.as_str().to_string())),
        };
        tracing::info!(
            component = %self.name,
            "extract files using 'storage_backend' = [fs]"
        );

        let ledger = HousekeepingLedger::new(&self.params.path, &self.params.housekeeping);
        let files = self.list_candidates(&fs, &ledger)?;
        if files.is_empty() {
            return Ok(ExtractSummary::default());
        }

        let mut summary = ExtractSummary {
            files_extracted: files.len(),
            ..ExtractSummary::default()
        };
        let basenames: Vec<String> = files.iter().map(|f| basename_of(f)).collect();

        if self.params.read_mode == ReadMode::All || files.len() == 1 {
            let dataset = self.read(&files).await?;
            // Ledger first: a downstream failure must not cause a retry
            // of files that were already read in full.
            ledger.merge(&fs, basenames)?;
            summary.rows_forwarded = dataset.num_rows() as u64;
            self.transformer.run(dataset).await?;
            summary.datasets_forwarded = 1;
        } else {
            for file in &files {
                let dataset = self.read(std::slice::from_ref(file)).await?;
                summary.rows_forwarded += dataset.num_rows() as u64;
                self.transformer.run(dataset).await?;
                summary.datasets_forwarded += 1;
            }
            ledger.merge(&fs, basenames)?;
        }
        Ok(summary)
    }
}

/// Read one or more CSV files with arrow-csv, concatenating their
/// batches. All files must share an inferred schema.
fn read_csv_arrow(sources: &[PathBuf]) -> Result<Dataset> {
    let mut combined: Vec<RecordBatch> = Vec::new();
    let mut schema: Option<SchemaRef> = None;

    for path in sources {
        let (file_schema, batches) = read_one_csv(path)?;
        match &schema {
            None => schema = Some(file_schema),
            Some(existing) => {
                if existing.as_ref() != file_schema.as_ref() {
                    return Err(EtlError::backend_read(anyhow::anyhow!(
                        "schema of [{}] does not match earlier inputs",
                        path.display()
                    )));
                }
            }
        }
        combined.extend(batches);
    }

    let schema = schema.unwrap_or_else(|| Arc::new(Schema::empty()));
    Ok(Dataset::new(schema, combined))
}

fn read_one_csv(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut file = File::open(path).map_err(EtlError::backend_read)?;
    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, Some(SCHEMA_INFER_MAX_RECORDS))
        .map_err(EtlError::backend_read)?;
    file.rewind().map_err(EtlError::backend_read)?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(file)
        .map_err(EtlError::backend_read)?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(EtlError::backend_read)?;
    Ok((schema, batches))
}

/// Read one or more CSV files in a single DataFusion scan.
async fn read_csv_datafusion(sources: &[PathBuf]) -> Result<Dataset> {
    let ctx = SessionContext::new();
    let paths: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
    let df = ctx
        .read_csv(paths, CsvReadOptions::new().has_header(true))
        .await
        .map_err(EtlError::backend_read)?;
    let schema = Arc::new(Schema::from(df.schema()));
    let batches = df.collect().await.map_err(EtlError::backend_read)?;
    Ok(Dataset::new(schema, batches))
}
