//! Depth-first traversal of monitored roots

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Visit every file and symlink below `root`, calling `visit` with its path
///
/// A root that is itself a file or symlink is visited directly and symlinks
/// are never followed. Entries come in directory listing order. A root that
/// does not exist is skipped without error.
///
/// # Errors
///
/// Returns an error if traversal fails below an existing root, or the first
/// error returned by `visit`.
pub(crate) fn visit_files<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(PathBuf) -> Result<()>,
{
    match fs::symlink_metadata(root) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!("Skipping missing root {}", root.display());
            return Ok(());
        }
        Err(source) => {
            return Err(Error::Metadata {
                path: root.to_path_buf(),
                source,
            });
        }
    }

    for entry in WalkDir::new(root).follow_links(false).follow_root_links(false) {
        let entry = entry.map_err(|source| Error::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type();

        if file_type.is_file() || file_type.is_symlink() {
            visit(entry.into_path())?;
        }
    }

    Ok(())
}
