//! SHA-1 content hashing and the lazily computed hash cell

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Streaming file hasher
pub struct FileHasher;

impl FileHasher {
    /// Compute the lowercase hex SHA-1 of a file by streaming its contents
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hash`] if the file cannot be opened or read.
    pub fn sha1_hex(path: &Path) -> Result<String> {
        let io_err = |source| Error::Hash {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha1::new();
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(io_err)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

/// Content hash that is computed on first access and then kept forever
///
/// The cached value is never invalidated, even if the file changes later on
/// during the lifetime of the owning state.
#[derive(Debug, Clone, Default)]
pub struct LazyHash {
    cell: OnceLock<String>,
}

impl LazyHash {
    /// A hash that has not been computed yet
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// A hash seeded with a known value
    #[must_use]
    pub fn seeded(sha1: String) -> Self {
        Self {
            cell: OnceLock::from(sha1),
        }
    }

    /// Seeded when `sha1` is present, pending otherwise
    #[must_use]
    pub fn from_option(sha1: Option<String>) -> Self {
        sha1.map_or_else(Self::pending, Self::seeded)
    }

    /// Whether the hash is already known
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the hash, computing it from the file at `path` if still pending
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hash`] if the hash has to be computed and the file
    /// cannot be read. A failed computation leaves the hash pending.
    pub fn get_or_compute(&self, path: &Path) -> Result<&str> {
        if let Some(sha1) = self.cell.get() {
            return Ok(sha1);
        }
        let computed = FileHasher::sha1_hex(path)?;
        Ok(self.cell.get_or_init(|| computed))
    }
}
