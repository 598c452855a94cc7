//! Append-only JSON-lines product file.
//!
//! One record per line; appending never rewrites earlier content, so
//! records accumulate across runs and an interrupted write can at worst
//! tear its own final line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use attire_core::ProductRecord;

use crate::StoreError;

pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, one JSON object per line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failure and
    /// [`StoreError::Encode`] if a record cannot be serialized.
    pub fn append(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{line}").map_err(|e| self.io_err(e))?;
        }

        Ok(())
    }

    /// Load every parseable record. A missing file is an empty store;
    /// unparseable lines (e.g. a torn final line) are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failure other than the
    /// file being absent.
    pub fn load(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ProductRecord>(line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "skipping unparseable line");
                }
            }
        }
        Ok(records)
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// File name for one category's records within a site's output directory.
#[must_use]
pub fn category_path(dir: &Path, site: &str, category: &str) -> PathBuf {
    dir.join(format!("{site}_{category}.jsonl"))
}
