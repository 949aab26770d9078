//! On-disk state document

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::state::StateRecord;

/// Persisted collection of file state records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    /// One flat record per monitored file
    pub files: Vec<StateRecord>,
}

/// Read and parse a state document
///
/// Errors carry their context chain so a caller can log why a previous state
/// was not usable.
pub(crate) fn read(path: &Path) -> anyhow::Result<StateDocument> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Serialize a state document, creating missing parent directories
pub(crate) fn write(path: &Path, document: &StateDocument) -> Result<()> {
    let write_err = |source| Error::WriteState {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_vec(document)?;
    fs::write(path, json).map_err(write_err)
}
