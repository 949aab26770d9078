//! Tiered change detection: modification time, then size, then content hash

use std::path::{Path, PathBuf};

use super::hash::LazyHash;
use super::metadata;
use super::{FileState, StateRecord, Strategy, ensure_non_empty, ensure_same_path};
use crate::error::Result;

/// File state running the cheapest checks first
///
/// An unchanged modification time is trusted without further checks. A
/// changed modification time is only reported as a change when the size or
/// the content hash differs too, so touching a file without editing it is
/// not a change.
#[derive(Debug, Clone)]
pub struct SmartState {
    path: PathBuf,
    last_modified: i64,
    size: u64,
    sha1: LazyHash,
}

impl SmartState {
    /// Create a state from known values, leaving the hash pending if `sha1` is `None`
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty.
    pub fn from_parts(
        path: impl Into<PathBuf>,
        last_modified: i64,
        size: u64,
        sha1: Option<String>,
    ) -> Result<Self> {
        let path = path.into();
        ensure_non_empty(&path)?;
        Ok(Self {
            path,
            last_modified,
            size,
            sha1: LazyHash::from_option(sha1),
        })
    }

    /// Modification time in milliseconds since the Unix epoch
    #[must_use]
    pub const fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Size of the file in bytes
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
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

impl FileState for SmartState {
    const STRATEGY: Strategy = Strategy::Smart;

    fn from_path(path: PathBuf) -> Result<Self> {
        ensure_non_empty(&path)?;
        let stat = metadata::stat(&path)?;
        let last_modified = metadata::modified_millis(&path, &stat)?;
        Ok(Self {
            path,
            last_modified,
            size: stat.len(),
            sha1: LazyHash::pending(),
        })
    }

    fn from_record(record: StateRecord) -> Result<Self> {
        ensure_non_empty(&record.path)?;
        if record.is_path_only() {
            return Self::from_path(record.path);
        }
        let last_modified = record.require(record.last_modified, "lastModified")?;
        let size = record.require(record.size, "size")?;
        Ok(Self {
            path: record.path,
            last_modified,
            size,
            sha1: LazyHash::from_option(record.sha1),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_different_from(&self, other: &Self) -> Result<bool> {
        ensure_same_path(&self.path, &other.path)?;

        if self.last_modified == other.last_modified {
            return Ok(false);
        }
        if self.size != other.size {
            return Ok(true);
        }
        Ok(self.content_hash()? != other.content_hash()?)
    }

    fn to_record(&self) -> Result<StateRecord> {
        Ok(StateRecord::new(self.path.clone())
            .with_last_modified(self.last_modified)
            .with_size(self.size)
            .with_sha1(self.content_hash()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use filetime::{FileTime, set_file_mtime};
    use std::fs;
    use tempfile::TempDir;

    const JULY_4_2017_MS: i64 = 1_499_126_400_000;
    const ONE_SECOND_LATER_MS: i64 = JULY_4_2017_MS + 1000;
    const TEST_CONTENT: &str = "Hash this!";
    const TEST_CONTENT_HASH: &str = "c2ed55283b7e9050c77b97064fed220afaea3bf7";
    const HASH_OF_A: &str = "86f7e437faa5a7fce15d1ddcb9eaeaea377667b8";
    const HASH_OF_B: &str = "e9d71f5ee7c92d6dc9e92ffdad17b8bd49418f98";

    fn setup() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("test.txt");
        fs::write(&file, TEST_CONTENT).unwrap();
        set_file_mtime(&file, FileTime::from_unix_time(1_499_126_400, 0)).unwrap();
        (tmp, file)
    }

    #[test]
    fn test_reads_mtime_and_size_if_only_path_given() {
        let (_tmp, file) = setup();

        let state = SmartState::from_record(StateRecord::new(file.clone())).unwrap();
        assert_eq!(state.path(), file);
        assert_eq!(state.last_modified(), JULY_4_2017_MS);
        assert_eq!(state.size(), TEST_CONTENT.len() as u64);
        assert!(!state.is_hash_computed());
    }

    #[test]
    fn test_assigns_record_values() {
        let record = StateRecord::new("missing.txt")
            .with_last_modified(JULY_4_2017_MS)
            .with_size(10)
            .with_sha1(TEST_CONTENT_HASH);
        let state = SmartState::from_record(record).unwrap();

        assert_eq!(state.last_modified(), JULY_4_2017_MS);
        assert_eq!(state.size(), 10);
        assert_eq!(state.content_hash().unwrap(), TEST_CONTENT_HASH);
    }

    #[test]
    fn test_record_without_size_rejected() {
        let record = StateRecord::new("a.txt").with_last_modified(JULY_4_2017_MS);
        assert!(matches!(
            SmartState::from_record(record),
            Err(Error::MissingField { field: "size", .. })
        ));
    }

    #[test]
    fn test_hash_computed_on_demand() {
        let (_tmp, file) = setup();

        let state = SmartState::from_path(file).unwrap();
        assert!(!state.is_hash_computed());
        assert_eq!(state.content_hash().unwrap(), TEST_CONTENT_HASH);
        assert!(state.is_hash_computed());
    }

    #[test]
    fn test_different_paths_error() {
        let state1 = SmartState::from_parts("test.txt", JULY_4_2017_MS, 1, None).unwrap();
        let state2 = SmartState::from_parts("other.txt", JULY_4_2017_MS, 1, None).unwrap();

        let err = state1.is_different_from(&state2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "can only compare files with the same path, but tried to compare test.txt with other.txt"
        );
    }

    #[test]
    fn test_same_mtime_wins_over_size_and_hash() {
        let state1 =
            SmartState::from_parts("test.txt", JULY_4_2017_MS, 1, Some(HASH_OF_A.into())).unwrap();
        let state2 =
            SmartState::from_parts("test.txt", JULY_4_2017_MS, 2, Some(HASH_OF_B.into())).unwrap();

        assert!(!state1.is_different_from(&state2).unwrap());
        assert!(!state2.is_different_from(&state1).unwrap());
    }

    #[test]
    fn test_same_mtime_never_hashes() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.txt");

        let state1 = SmartState::from_parts(&missing, JULY_4_2017_MS, 1, None).unwrap();
        let state2 = SmartState::from_parts(&missing, JULY_4_2017_MS, 1, None).unwrap();

        assert!(!state1.is_different_from(&state2).unwrap());
        assert!(!state1.is_hash_computed());
        assert!(!state2.is_hash_computed());
    }

    #[test]
    fn test_modified_with_different_size() {
        let state1 = SmartState::from_parts("test.txt", JULY_4_2017_MS, 1, None).unwrap();
        let state2 = SmartState::from_parts("test.txt", ONE_SECOND_LATER_MS, 2, None).unwrap();

        assert!(state1.is_different_from(&state2).unwrap());
        assert!(state2.is_different_from(&state1).unwrap());
        // Size mismatch decides before any hashing
        assert!(!state1.is_hash_computed());
    }

    #[test]
    fn test_modified_same_size_different_hash() {
        let state1 =
            SmartState::from_parts("test.txt", JULY_4_2017_MS, 1, Some(HASH_OF_A.into())).unwrap();
        let state2 =
            SmartState::from_parts("test.txt", ONE_SECOND_LATER_MS, 1, Some(HASH_OF_B.into()))
                .unwrap();

        assert!(state1.is_different_from(&state2).unwrap());
        assert!(state2.is_different_from(&state1).unwrap());
    }

    #[test]
    fn test_touched_without_edit_is_not_different() {
        let (_tmp, file) = setup();
        let stored = SmartState::from_parts(
            &file,
            JULY_4_2017_MS - 5000,
            TEST_CONTENT.len() as u64,
            Some(TEST_CONTENT_HASH.into()),
        )
        .unwrap();

        let fresh = SmartState::from_path(file).unwrap();
        assert!(!fresh.is_different_from(&stored).unwrap());
        assert!(fresh.is_hash_computed());
    }

    #[test]
    fn test_edit_with_same_size_is_different() {
        let (_tmp, file) = setup();
        let stored = SmartState::from_parts(
            &file,
            JULY_4_2017_MS - 5000,
            TEST_CONTENT.len() as u64,
            Some(TEST_CONTENT_HASH.into()),
        )
        .unwrap();

        fs::write(&file, "Hash that!").unwrap();
        let fresh = SmartState::from_path(file).unwrap();
        assert!(fresh.is_different_from(&stored).unwrap());
    }

    #[test]
    fn test_to_record_serializes_all_fields() {
        let (_tmp, file) = setup();

        let state = SmartState::from_record(StateRecord::new(file.clone())).unwrap();
        assert_eq!(
            state.to_record().unwrap(),
            StateRecord::new(file)
                .with_last_modified(JULY_4_2017_MS)
                .with_size(TEST_CONTENT.len() as u64)
                .with_sha1(TEST_CONTENT_HASH)
        );
    }

    #[test]
    fn test_record_round_trip() {
        let record = StateRecord::new("test.txt")
            .with_last_modified(JULY_4_2017_MS)
            .with_size(42)
            .with_sha1(HASH_OF_A);

        let state = SmartState::from_record(record.clone()).unwrap();
        assert_eq!(state.to_record().unwrap(), record);
    }
}
