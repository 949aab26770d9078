//! Change detection by file size

use std::path::{Path, PathBuf};

use super::metadata;
use super::{FileState, StateRecord, Strategy, ensure_non_empty, ensure_same_path};
use crate::error::Result;

/// File state comparing file sizes in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeState {
    path: PathBuf,
    size: u64,
}

impl SizeState {
    /// Create a state with a known size
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty.
    pub fn with_size(path: impl Into<PathBuf>, size: u64) -> Result<Self> {
        let path = path.into();
        ensure_non_empty(&path)?;
        Ok(Self { path, size })
    }

    /// Size of the file in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

impl FileState for SizeState {
    const STRATEGY: Strategy = Strategy::Size;

    fn from_path(path: PathBuf) -> Result<Self> {
        ensure_non_empty(&path)?;
        let size = metadata::stat(&path)?.len();
        Ok(Self { path, size })
    }

    fn from_record(record: StateRecord) -> Result<Self> {
        ensure_non_empty(&record.path)?;
        if record.is_path_only() {
            return Self::from_path(record.path);
        }
        let size = record.require(record.size, "size")?;
        Ok(Self {
            path: record.path,
            size,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_different_from(&self, other: &Self) -> Result<bool> {
        ensure_same_path(&self.path, &other.path)?;
        Ok(self.size != other.size)
    }

    fn to_record(&self) -> Result<StateRecord> {
        Ok(StateRecord::new(self.path.clone()).with_size(self.size))
    }
}
