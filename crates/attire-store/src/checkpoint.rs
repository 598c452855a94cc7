//! Whole-file JSON progress checkpoint.

use std::path::{Path, PathBuf};

use attire_core::ProgressCheckpoint;

use crate::StoreError;

pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the checkpoint with the current progress snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failure and
    /// [`StoreError::Encode`] if the snapshot cannot be serialized.
    pub fn save(&self, checkpoint: &ProgressCheckpoint) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let payload = serde_json::to_vec_pretty(checkpoint)?;
        std::fs::write(&self.path, payload).map_err(|e| self.io_err(e))
    }

    /// Load the previous snapshot. A missing or unreadable checkpoint is
    /// `None` — the run starts from scratch rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failure other than the
    /// file being absent.
    pub fn load(&self) -> Result<Option<ProgressCheckpoint>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };

        match serde_json::from_str(&content) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "checkpoint unreadable; starting fresh");
                Ok(None)
            }
        }
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use attire_core::{CategorySpec, ProgressCheckpoint};

    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("attire-checkpoint-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(format!("{tag}.json"))
    }

    fn checkpoint() -> ProgressCheckpoint {
        ProgressCheckpoint::new(
            2,
            vec![CategorySpec {
                url: "https://shop.example/us/en/man-jackets-l640.html".to_string(),
                name: "man-jackets".to_string(),
                gender: "male".to_string(),
            }],
            vec![],
        )
    }

    #[test]
    fn save_and_load_roundtrip() {
        let file = CheckpointFile::new(temp_path("roundtrip"));
        file.save(&checkpoint()).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.current_index, 2);
        assert_eq!(loaded.categories.len(), 1);
        assert_eq!(loaded.categories[0].name, "man-jackets");
        assert!(!loaded.timestamp.is_empty());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let file = CheckpointFile::new(temp_path("overwrite"));
        file.save(&checkpoint()).unwrap();

        let mut next = checkpoint();
        next.current_index = 3;
        file.save(&next).unwrap();

        assert_eq!(file.load().unwrap().unwrap().current_index, 3);
    }

    #[test]
    fn missing_file_loads_none() {
        let file = CheckpointFile::new(temp_path("missing"));
        let _ = std::fs::remove_file(file.path());
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_loads_none() {
        let file = CheckpointFile::new(temp_path("corrupt"));
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
