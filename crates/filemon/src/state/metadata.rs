//! File metadata lookups shared by the stat-based strategies

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Read metadata for `path`, following symlinks to their target
pub(crate) fn stat(path: &Path) -> Result<Metadata> {
    fs::metadata(path).map_err(|source| Error::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Modification time of a stat'ed file in epoch milliseconds
pub(crate) fn modified_millis(path: &Path, metadata: &Metadata) -> Result<i64> {
    let modified = metadata.modified().map_err(|source| Error::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(epoch_millis(modified))
}

/// Convert a timestamp to signed milliseconds relative to the Unix epoch
pub(crate) fn epoch_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
    }
}
