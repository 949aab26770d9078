//! Change detection by SHA-1 content hash

use std::path::{Path, PathBuf};

use super::hash::LazyHash;
use super::{FileState, StateRecord, Strategy, ensure_non_empty, ensure_same_path};
use crate::error::Result;

/// File state comparing SHA-1 hashes of the file content
///
/// The hash is only computed when first needed.
#[derive(Debug, Clone)]
pub struct ContentHashState {
    path: PathBuf,
    sha1: LazyHash,
}

impl ContentHashState {
    /// Create a state with an already known content hash
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty.
    pub fn with_hash(path: impl Into<PathBuf>, sha1: impl Into<String>) -> Result<Self> {
        let path = path.into();
        ensure_non_empty(&path)?;
        Ok(Self {
            path,
            sha1: LazyHash::seeded(sha1.into()),
        })
    }

    /// SHA-1 of the file content, computed on first access
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is still pending and the file cannot be read.
    pub fn content_hash(&self) -> Result<&str> {
        self.sha1.get_or_compute(&self.path)
    }

    /// Whether the content hash has been computed or supplied already
    #[must_use]
    pub fn is_hash_computed(&self) -> bool {
        self.sha1.is_computed()
    }
}

impl FileState for ContentHashState {
    const STRATEGY: Strategy = Strategy::Hash;

    fn from_path(path: PathBuf) -> Result<Self> {
        ensure_non_empty(&path)?;
        Ok(Self {
            path,
            sha1: LazyHash::pending(),
        })
    }

    fn from_record(record: StateRecord) -> Result<Self> {
        ensure_non_empty(&record.path)?;
        Ok(Self {
            path: record.path,
            sha1: LazyHash::from_option(record.sha1),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_different_from(&self, other: &Self) -> Result<bool> {
        ensure_same_path(&self.path, &other.path)?;
        Ok(self.content_hash()? != other.content_hash()?)
    }

    fn to_record(&self) -> Result<StateRecord> {
        Ok(StateRecord::new(self.path.clone()).with_sha1(self.content_hash()?))
    }
}
