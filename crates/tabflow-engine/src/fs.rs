//! Filesystem contract consumed by the extraction stage and the
//! housekeeping ledger.
//!
//! [`Filesystem`] is the seam behind which object-store backends would
//! sit; only [`LocalFilesystem`] is implemented.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tabflow_types::Result;

/// What a directory entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry from a directory listing.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub modified: SystemTime,
}

impl FileEntry {
    /// The entry's basename, lossily decoded.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Storage access contract: listing plus small-text read/write.
pub trait Filesystem: Send + Sync {
    /// List the entries directly under `path` (no recursion).
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be read.
    fn list(&self, path: &Path) -> Result<Vec<FileEntry>>;

    fn exists(&self, path: &Path) -> bool;

    /// Read a UTF-8 text file in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a UTF-8 text file, replacing any previous contents and
    /// creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Local-disk implementation of [`Filesystem`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn list(&self, path: &Path) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(FileEntry {
                path: entry.path(),
                kind,
                modified: metadata.modified()?,
            });
        }
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }
}
