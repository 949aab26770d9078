//! Change detection over walked roots
//!
//! A [`FileMonitor`] keeps three path-keyed maps:
//! - `loaded`: states from the previous run that have not been matched yet
//! - `processed`: the current state of every visited file (what gets persisted)
//! - `changed`: files created or changed since the previous run
//!
//! Whatever is left in `loaded` after a walk has been deleted.

mod store;
mod walk;


use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use store::StateDocument;

use crate::error::Result;
use crate::state::{
    ContentHashState, FileState, LastModifiedState, SizeState, SmartState, Strategy,
};

/// Classification of a path after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Not present in the previous state
    Created,
    /// Present before and detected as different
    Changed,
    /// Present before but not visited in the latest run
    Deleted,
}

impl FileStatus {
    /// Lowercase name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Changed paths and their classification
pub type ChangeSet = BTreeMap<PathBuf, FileStatus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Empty,
    Loaded,
    Updated,
}

/// Monitors the state of a set of files using one comparison strategy
#[derive(Debug)]
pub struct FileMonitor<S: FileState> {
    loaded: BTreeMap<PathBuf, S>,
    processed: BTreeMap<PathBuf, S>,
    changed: BTreeMap<PathBuf, FileStatus>,
    phase: Phase,
}

impl<S: FileState> Default for FileMonitor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FileState> FileMonitor<S> {
    /// Create an empty monitor
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loaded: BTreeMap::new(),
            processed: BTreeMap::new(),
            changed: BTreeMap::new(),
            phase: Phase::Empty,
        }
    }

    /// Strategy this monitor compares files with
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        S::STRATEGY
    }

    /// Load the file states recorded by a previous run
    ///
    /// On success the loaded states become the baseline of the next update and
    /// the results of earlier updates are dropped.
    ///
    /// Returns `false` if the state file is missing, unreadable or cannot be
    /// parsed for this strategy. The monitor is left untouched in that case.
    pub fn load(&mut self, state_file: impl AsRef<Path>) -> bool {
        let state_file = state_file.as_ref();

        match Self::read_states(state_file) {
            Ok(loaded) => {
                debug!(
                    "Loaded {} file states from {}",
                    loaded.len(),
                    state_file.display()
                );
                self.loaded = loaded;
                self.processed.clear();
                self.changed.clear();
                self.phase = Phase::Loaded;
                true
            }
            Err(e) => {
                debug!("Ignoring previous state: {e:#}");
                false
            }
        }
    }

    fn read_states(state_file: &Path) -> anyhow::Result<BTreeMap<PathBuf, S>> {
        let document = store::read(state_file)?;

        document
            .files
            .into_iter()
            .map(|record| -> anyhow::Result<(PathBuf, S)> {
                let state = S::from_record(record)?;
                Ok((state.path().to_path_buf(), state))
            })
            .collect()
    }

    /// Write the states of all processed files to `state_file`
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if a lazy field cannot be computed or the file cannot
    /// be written.
    pub fn write(&self, state_file: impl AsRef<Path>) -> Result<()> {
        let state_file = state_file.as_ref();
        let document = StateDocument {
            files: self
                .processed
                .values()
                .map(FileState::to_record)
                .collect::<Result<_>>()?,
        };

        store::write(state_file, &document)?;
        debug!(
            "Wrote {} file states to {}",
            document.files.len(),
            state_file.display()
        );
        Ok(())
    }

    /// Walk `paths` and classify every visited file against the previous state
    ///
    /// Directly after [`Self::load`] the loaded states are the baseline;
    /// afterwards each call compares against the result of the previous
    /// update. States recorded by [`Self::update_file_state`] since then join
    /// the baseline. Roots that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a root cannot be traversed or a visited file cannot
    /// be inspected. The monitor is then reset to the baseline this call
    /// started from and no file is classified, so the next update compares
    /// against the same states again.
    pub fn update<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if self.phase == Phase::Updated {
            self.loaded = mem::take(&mut self.processed);
        } else {
            self.loaded.extend(mem::take(&mut self.processed));
        }
        self.changed.clear();
        self.phase = Phase::Loaded;

        let mut replaced = Vec::new();
        for root in paths {
            let walked = walk::visit_files(root.as_ref(), |path| {
                replaced.extend(self.classify(path)?);
                Ok(())
            });
            if let Err(e) = walked {
                self.restore_baseline(replaced);
                return Err(e);
            }
        }
        self.phase = Phase::Updated;

        debug!(
            "Processed {} files: {} created or changed, {} deleted",
            self.processed.len(),
            self.changed.len(),
            self.loaded.len()
        );
        Ok(())
    }

    /// Put every state claimed by an aborted walk back into `loaded`
    ///
    /// `replaced` holds the previous states of files classified as changed.
    fn restore_baseline(&mut self, replaced: Vec<(PathBuf, S)>) {
        for (path, status) in mem::take(&mut self.changed) {
            if status == FileStatus::Created {
                self.processed.remove(&path);
            }
        }
        self.processed.extend(replaced);
        self.loaded.extend(mem::take(&mut self.processed));
        debug!(
            "Update aborted, keeping {} baseline file states",
            self.loaded.len()
        );
    }

    /// Detect changes to a single file and record its new state
    ///
    /// An unchanged file keeps its previous state so already computed lazy
    /// fields are not thrown away.
    ///
    /// # Errors
    ///
    /// Returns an error if the file state cannot be built or compared. A state
    /// claimed from the previous run stays in place in that case.
    pub fn update_file_state(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.classify(path.into()).map(drop)
    }

    /// Classify `path`, returning the previous state if the file changed
    fn classify(&mut self, path: PathBuf) -> Result<Option<(PathBuf, S)>> {
        let fresh = S::from_path(path.clone())?;

        let Some(existing) = self.loaded.remove(&path) else {
            trace!("{} created", path.display());
            self.changed.insert(path.clone(), FileStatus::Created);
            self.processed.insert(path, fresh);
            return Ok(None);
        };

        let different = match fresh.is_different_from(&existing) {
            Ok(different) => different,
            Err(e) => {
                self.loaded.insert(path, existing);
                return Err(e);
            }
        };

        if different {
            trace!("{} changed", path.display());
            self.changed.insert(path.clone(), FileStatus::Changed);
            self.processed.insert(path.clone(), fresh);
            Ok(Some((path, existing)))
        } else {
            self.processed.insert(path, existing);
            Ok(None)
        }
    }

    /// Created and changed files of the last update plus deleted files
    #[must_use]
    pub fn changed_files(&self) -> ChangeSet {
        let mut changed = self.changed.clone();
        for path in self.loaded.keys() {
            changed.insert(path.clone(), FileStatus::Deleted);
        }
        changed
    }
}

/// Strategy-erased view of a [`FileMonitor`]
///
/// Allows picking the comparison strategy at runtime, for example from a
/// configuration file.
pub trait ChangeDetector {
    /// Strategy files are compared with
    fn strategy(&self) -> Strategy;

    /// See [`FileMonitor::load`]
    fn load(&mut self, state_file: &Path) -> bool;

    /// See [`FileMonitor::write`]
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    fn write(&self, state_file: &Path) -> Result<()>;

    /// See [`FileMonitor::update`]
    ///
    /// # Errors
    ///
    /// Returns an error if a root cannot be traversed or a file inspected.
    fn update(&mut self, paths: &[PathBuf]) -> Result<()>;

    /// See [`FileMonitor::changed_files`]
    fn changed_files(&self) -> ChangeSet;
}

impl<S: FileState> ChangeDetector for FileMonitor<S> {
    fn strategy(&self) -> Strategy {
        S::STRATEGY
    }

    fn load(&mut self, state_file: &Path) -> bool {
        Self::load(self, state_file)
    }

    fn write(&self, state_file: &Path) -> Result<()> {
        Self::write(self, state_file)
    }

    fn update(&mut self, paths: &[PathBuf]) -> Result<()> {
        Self::update(self, paths)
    }

    fn changed_files(&self) -> ChangeSet {
        Self::changed_files(self)
    }
}

impl Strategy {
    /// Create an empty monitor comparing files with this strategy
    #[must_use]
    pub fn monitor(self) -> Box<dyn ChangeDetector> {
        match self {
            Self::Hash => Box::new(FileMonitor::<ContentHashState>::new()),
            Self::ModTime => Box::new(FileMonitor::<LastModifiedState>::new()),
            Self::Size => Box::new(FileMonitor::<SizeState>::new()),
            Self::Smart => Box::new(FileMonitor::<SmartState>::new()),
        }
    }
}
