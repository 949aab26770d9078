//! Change detection by modification time

use std::path::{Path, PathBuf};

use super::metadata;
use super::{FileState, StateRecord, Strategy, ensure_non_empty, ensure_same_path};
use crate::error::Result;

/// File state comparing modification times in epoch milliseconds
///
/// Cheap, but a touch without an edit is reported as a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastModifiedState {
    path: PathBuf,
    last_modified: i64,
}

impl LastModifiedState {
    /// Create a state with a known modification time
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty.
    pub fn with_last_modified(path: impl Into<PathBuf>, last_modified: i64) -> Result<Self> {
        let path = path.into();
        ensure_non_empty(&path)?;
        Ok(Self {
            path,
            last_modified,
        })
    }

    /// Modification time in milliseconds since the Unix epoch
    #[must_use]
    pub const fn last_modified(&self) -> i64 {
        self.last_modified
    }
}

impl FileState for LastModifiedState {
    const STRATEGY: Strategy = Strategy::ModTime;

    fn from_path(path: PathBuf) -> Result<Self> {
        ensure_non_empty(&path)?;
        let stat = metadata::stat(&path)?;
        let last_modified = metadata::modified_millis(&path, &stat)?;
        Ok(Self {
            path,
            last_modified,
        })
    }

    fn from_record(record: StateRecord) -> Result<Self> {
        ensure_non_empty(&record.path)?;
        if record.is_path_only() {
            return Self::from_path(record.path);
        }
        let last_modified = record.require(record.last_modified, "lastModified")?;
        Ok(Self {
            path: record.path,
            last_modified,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_different_from(&self, other: &Self) -> Result<bool> {
        ensure_same_path(&self.path, &other.path)?;
        Ok(self.last_modified != other.last_modified)
    }

    fn to_record(&self) -> Result<StateRecord> {
        Ok(StateRecord::new(self.path.clone()).with_last_modified(self.last_modified))
    }
}
