//! Housekeeping ledger: the persisted set of basenames already extracted.
//!
//! Plain UTF-8 text, one basename per line, trailing newline. Created
//! lazily on the first merge; read-before-write set union, so re-adding
//! an already-listed name is a no-op. Not transactional — the design
//! assumes exactly one process per ledger path.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::fs::Filesystem;
use tabflow_types::Result;

/// Default ledger filename when the extract section does not set one.
pub const DEFAULT_LEDGER_FILE: &str = "etl.housekeeping";

#[derive(Debug, Clone)]
pub struct HousekeepingLedger {
    path: PathBuf,
    file_name: String,
}

impl HousekeepingLedger {
    /// Ledger living in `source_dir` under `file_name`.
    pub fn new(source_dir: &Path, file_name: &str) -> Self {
        Self {
            path: source_dir.join(file_name),
            file_name: file_name.to_string(),
        }
    }

    /// The bare ledger filename, excluded from extraction candidates.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Read the set of already-processed basenames.
    ///
    /// A missing ledger file is not an error: it means no extraction has
    /// completed yet, logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing ledger file cannot be read.
    pub fn load(&self, fs: &dyn Filesystem) -> Result<BTreeSet<String>> {
        if !fs.exists(&self.path) {
            tracing::warn!("{} not available", self.file_name);
            return Ok(BTreeSet::new());
        }
        tracing::info!("read {} file", self.file_name);
        let contents = fs.read_to_string(&self.path)?;
        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Union `names` into the ledger and rewrite it in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read or written.
    pub fn merge<I>(&self, fs: &dyn Filesystem, names: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut ledger = self.load(fs)?;
        ledger.extend(names);

        let mut contents = String::new();
        for name in &ledger {
            contents.push_str(name);
            contents.push('\n');
        }
        fs.write_string(&self.path, &contents)
    }
}
