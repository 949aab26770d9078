//! Per-file state snapshots and comparison strategies
//!
//! A file state records just enough metadata about one file to decide
//! whether it changed between two runs:
//! - [`ContentHashState`]: SHA-1 content hash, computed lazily
//! - [`LastModifiedState`]: modification time in epoch milliseconds
//! - [`SizeState`]: size in bytes
//! - [`SmartState`]: modification time, then size, then content hash
//!
//! Every state can be built fresh from a path (reading metadata from disk)
//! or rehydrated from a [`StateRecord`] persisted by an earlier run.

mod content_hash;
mod hash;
mod last_modified;
mod metadata;
mod size;
mod smart;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use content_hash::ContentHashState;
pub use hash::{FileHasher, LazyHash};
pub use last_modified::LastModifiedState;
pub use size::SizeState;
pub use smart::SmartState;

use crate::error::{Error, Result};

/// Capability set shared by all comparison strategies
///
/// The monitor only talks to this trait, so it stays agnostic of the
/// concrete strategy it was instantiated with.
pub trait FileState: Sized {
    /// Strategy implemented by this state type
    const STRATEGY: Strategy;

    /// Build a fresh state for the file at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or, for strategies with eagerly
    /// populated fields, if the file metadata cannot be read.
    fn from_path(path: PathBuf) -> Result<Self>;

    /// Rehydrate a state from a persisted record
    ///
    /// A record carrying nothing but a path is treated like [`Self::from_path`].
    /// Records written under another strategy usually lack this strategy's
    /// fields, so switching strategies makes [`FileMonitor::load`] ignore the
    /// previous state document and every file is reported as created.
    ///
    /// [`FileMonitor::load`]: crate::FileMonitor::load
    ///
    /// # Errors
    ///
    /// Returns an error if a declared field is missing from a non-trivial
    /// record, or if fresh construction fails.
    fn from_record(record: StateRecord) -> Result<Self>;

    /// Path this state describes
    fn path(&self) -> &Path;

    /// Check whether `other` describes a different version of the same file
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathMismatch`] if the two states describe different
    /// paths, or an I/O error if a lazy field has to be computed and the file
    /// cannot be read.
    fn is_different_from(&self, other: &Self) -> Result<bool>;

    /// Serialize into a flat record with every declared field populated
    ///
    /// # Errors
    ///
    /// Returns an error if a lazy field cannot be computed.
    fn to_record(&self) -> Result<StateRecord>;
}

/// Flat serialized form of a file state
///
/// Only `path` is mandatory; each strategy populates the fields it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    /// File the record describes
    pub path: PathBuf,

    /// Modification time in milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    /// File size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Lowercase hex SHA-1 of the file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl StateRecord {
    /// Create a record carrying only a path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
            size: None,
            sha1: None,
        }
    }

    /// Set the modification time
    #[must_use]
    pub const fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Set the size
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the content hash
    #[must_use]
    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    /// Whether the record has no fields besides `path`
    #[must_use]
    pub const fn is_path_only(&self) -> bool {
        self.last_modified.is_none() && self.size.is_none() && self.sha1.is_none()
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T> {
        value.ok_or_else(|| Error::MissingField {
            path: self.path.clone(),
            field,
        })
    }
}

/// Comparison strategy selector
///
/// Deserialization goes through [`FromStr`], so configuration files accept
/// the same aliases as the string parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Strategy {
    /// Compare SHA-1 content hashes
    Hash,
    /// Compare modification times
    ModTime,
    /// Compare file sizes
    Size,
    /// Modification time first, then size and content hash
    #[default]
    Smart,
}

impl Strategy {
    /// Canonical name used in configuration files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::ModTime => "mod-time",
            Self::Size => "size",
            Self::Smart => "smart",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" | "content-hash" => Ok(Self::Hash),
            "mod-time" | "modtime" | "mtime" | "last-modified" => Ok(Self::ModTime),
            "size" => Ok(Self::Size),
            "smart" => Ok(Self::Smart),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

pub(crate) fn ensure_non_empty(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }
    Ok(())
}

pub(crate) fn ensure_same_path(left: &Path, right: &Path) -> Result<()> {
    if left != right {
        return Err(Error::PathMismatch {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str_aliases() {
        assert_eq!("hash".parse::<Strategy>().unwrap(), Strategy::Hash);
        assert_eq!("content-hash".parse::<Strategy>().unwrap(), Strategy::Hash);
        assert_eq!("mtime".parse::<Strategy>().unwrap(), Strategy::ModTime);
        assert_eq!("Last-Modified".parse::<Strategy>().unwrap(), Strategy::ModTime);
        assert_eq!("size".parse::<Strategy>().unwrap(), Strategy::Size);
        assert_eq!(" smart ".parse::<Strategy>().unwrap(), Strategy::Smart);
    }

    #[test]
    fn test_strategy_unknown_name() {
        let err = "checksum".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy(name) if name == "checksum"));
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in [Strategy::Hash, Strategy::ModTime, Strategy::Size, Strategy::Smart] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_strategy_serde_uses_kebab_case_and_aliases() {
        assert_eq!(serde_json::to_string(&Strategy::ModTime).unwrap(), r#""mod-time""#);
        assert_eq!(
            serde_json::from_str::<Strategy>(r#""mtime""#).unwrap(),
            Strategy::ModTime
        );
        assert!(serde_json::from_str::<Strategy>(r#""checksum""#).is_err());
    }

    #[test]
    fn test_record_serializes_only_present_fields() {
        let record = StateRecord::new("a.txt").with_size(3);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"path":"a.txt","size":3}"#);
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record: StateRecord =
            serde_json::from_str(r#"{"path":"a.txt","lastModified":1499126400000,"extra":true}"#)
                .unwrap();
        assert_eq!(record.last_modified, Some(1_499_126_400_000));
        assert!(!record.is_path_only());
    }

    #[test]
    fn test_record_path_only() {
        assert!(StateRecord::new("a.txt").is_path_only());
        assert!(!StateRecord::new("a.txt").with_sha1("abc").is_path_only());
    }

    #[test]
    fn test_ensure_same_path() {
        assert!(ensure_same_path(Path::new("a"), Path::new("a")).is_ok());
        assert!(matches!(
            ensure_same_path(Path::new("a"), Path::new("b")),
            Err(Error::PathMismatch { .. })
        ));
    }

    #[test]
    fn test_ensure_non_empty() {
        assert!(matches!(ensure_non_empty(Path::new("")), Err(Error::EmptyPath)));
        assert!(ensure_non_empty(Path::new("a.txt")).is_ok());
    }
}
