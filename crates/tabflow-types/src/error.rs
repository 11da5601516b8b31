//! Error taxonomy for pipeline assembly and execution.
//!
//! Nothing in the engine retries: every error propagates to the caller,
//! is logged once at the top level, and terminates the run.

use std::fmt;

use thiserror::Error;

/// Which registry a component was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    Extractor,
    Transformer,
    Storage,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Extractor => "extractor",
            Self::Transformer => "transformer",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Errors produced by pipeline assembly and execution.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A `type` discriminator had no registered constructor.
    #[error("unknown {role} type [{type_name}]")]
    UnknownComponentType {
        role: ComponentRole,
        type_name: String,
    },

    /// Filtering left no files and the run was configured to require some.
    #[error("no files found under [{path}] after filtering")]
    NoFilesFound { path: String },

    /// A required configuration field is absent or has the wrong shape.
    #[error("configuration error: {0}")]
    Config(String),

    /// Opaque failure from a tabular read backend.
    #[error("backend read error: {0}")]
    BackendRead(anyhow::Error),

    /// Opaque failure from a tabular write backend.
    #[error("backend write error: {0}")]
    BackendWrite(anyhow::Error),

    /// A declared storage backend with no implementation behind it.
    #[error("storage backend [{0}] is not supported")]
    UnsupportedBackend(String),

    /// File-system I/O failure (listing, ledger read/write).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    /// Wrap a backend failure observed while reading source data.
    pub fn backend_read(err: impl Into<anyhow::Error>) -> Self {
        Self::BackendRead(err.into())
    }

    /// Wrap a backend failure observed while persisting a dataset.
    pub fn backend_write(err: impl Into<anyhow::Error>) -> Self {
        Self::BackendWrite(err.into())
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EtlError>;
