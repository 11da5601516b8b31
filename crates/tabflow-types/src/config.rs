//! Pipeline configuration model.
//!
//! A pipeline document has three component sections (`extract`,
//! `transformer`, `storage`). Each carries a `type` discriminator and a
//! `name`; everything else is type-specific and is deserialized by the
//! selected component's constructor via [`ComponentConfig::params`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{EtlError, Result};

/// A fully parsed pipeline document. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub app_name: String,
    pub meta: MetaConfig,
    pub extract: ComponentConfig,
    pub transformer: ComponentConfig,
    pub storage: ComponentConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Logging threshold (`error`, `warn`, `info`, `debug`, `trace`).
    pub logging_level: String,
}

/// One component section: `type` + `name` plus type-specific options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(flatten)]
    pub options: serde_yaml::Mapping,
}

impl ComponentConfig {
    /// Deserialize the type-specific options into a typed params struct.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] when a required field is missing or a
    /// value has the wrong shape, naming the component for context.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(self.options.clone()))
            .map_err(|e| EtlError::Config(format!("[{}] {e}", self.name)))
    }
}

/// Where source files live and where outputs are written.
///
/// Only `fs` has an implementation; the other values are accepted by the
/// parser and fail with [`EtlError::UnsupportedBackend`] at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Fs,
    S3,
    Gcs,
    Abs,
}

impl StorageBackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fs => "fs",
            Self::S3 => "s3",
            Self::Gcs => "gcs",
            Self::Abs => "abs",
        }
    }
}

/// Whether extraction combines all surviving files into one dataset or
/// forwards each file individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    #[default]
    Single,
    All,
}

/// Which library performs the actual read, write, or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataPackage {
    /// arrow-csv: single-file reader/writer.
    Arrow,
    /// DataFusion: multi-file reads, sharded directory writes, SQL.
    Datafusion,
}

/// Declarative rule set narrowing a file listing to the files extracted.
///
/// When `key` is set, `include` and `exclude` are ignored. `skip` and
/// `keep_latest` apply only when prior filtering left survivors, in that
/// fixed order, against a newest-first listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Exact match on the basename stem (up to the first `.`).
    pub key: Option<String>,
    /// Substrings, any of which must appear in the stem.
    pub include: Vec<String>,
    /// Substrings, none of which may appear in the stem.
    pub exclude: Vec<String>,
    /// Number of newest survivors to discard.
    pub skip: Option<usize>,
    /// Retain only the single most recent survivor.
    pub keep_latest: bool,
}
