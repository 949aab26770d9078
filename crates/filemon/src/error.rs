use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by file states and the monitor
#[derive(Debug, Error)]
pub enum Error {
    /// Strategy name that does not map to any file state implementation
    #[error("unknown file state strategy `{0}`")]
    UnknownStrategy(String),

    /// Two states with different paths were compared
    #[error("can only compare files with the same path, but tried to compare {left} with {right}")]
    PathMismatch {
        /// Path of the state the comparison was invoked on
        left: PathBuf,
        /// Path of the state passed as argument
        right: PathBuf,
    },

    /// A state record without a path
    #[error("a file state requires a non-empty path")]
    EmptyPath,

    /// A rehydrated record lacks a field its strategy declares
    #[error("state record for {path} is missing field `{field}`")]
    MissingField {
        /// Path of the incomplete record
        path: PathBuf,
        /// Serialized name of the missing field
        field: &'static str,
    },

    /// File metadata could not be read
    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        /// File that was stat'ed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// File content could not be read for hashing
    #[error("failed to hash {path}: {source}")]
    Hash {
        /// File that was hashed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Directory traversal failed below a root
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Root being walked
        path: PathBuf,
        /// Underlying traversal error
        source: walkdir::Error,
    },

    /// State document could not be written
    #[error("failed to write state file {path}: {source}")]
    WriteState {
        /// Destination of the state document
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// State document could not be encoded
    #[error("failed to encode state document: {0}")]
    EncodeState(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::MonitorConfig`]
    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        /// Config file path, or `<inline>` for string input
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },
}
