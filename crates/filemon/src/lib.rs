//! # filemon
//!
//! Snapshot-based file change detection.
//!
//! A [`FileMonitor`] walks a set of root paths, records one [`FileState`] per
//! visited file and compares it to the state persisted by a previous run.
//! The comparison strategy is pluggable:
//! - [`ContentHashState`]: SHA-1 of the file content
//! - [`LastModifiedState`]: modification time in epoch milliseconds
//! - [`SizeState`]: file size in bytes
//! - [`SmartState`]: modification time first, then size and content hash

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Monitor configuration loaded from TOML
pub mod config;

/// Error types for the filemon library
pub mod error;

/// Change detection over walked roots
pub mod monitor;

/// Per-file state snapshots and comparison strategies
pub mod state;

pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use monitor::{ChangeDetector, ChangeSet, FileMonitor, FileStatus, StateDocument};
pub use state::{
    ContentHashState, FileState, LastModifiedState, SizeState, SmartState, StateRecord, Strategy,
};
