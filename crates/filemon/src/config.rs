//! Monitor configuration
//!
//! A TOML file selects the comparison strategy, where the state is kept and
//! which roots are walked:
//!
//! ```toml
//! strategy = "smart"
//! state_file = ".filemon/state.json"
//! paths = ["src", "assets"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::monitor::{ChangeDetector, ChangeSet};
use crate::state::Strategy;

/// Default location of the state document
pub const DEFAULT_STATE_FILE: &str = ".filemon/state.json";

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

/// Configuration for one monitored set of roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Comparison strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// State document written after each run
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Roots to walk
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            state_file: default_state_file(),
            paths: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseConfig`] for invalid TOML, unknown keys or an
    /// unknown strategy name.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ParseConfig {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Load a configuration file
    ///
    /// Relative `state_file` and `paths` entries are resolved against the
    /// directory containing the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.state_file = base.join(&config.state_file);
            config.paths = config.paths.iter().map(|p| base.join(p)).collect();
        }

        debug!(
            "Loaded config {} (strategy: {}, {} roots)",
            path.display(),
            config.strategy,
            config.paths.len()
        );
        Ok(config)
    }

    /// Create an empty monitor for the configured strategy
    #[must_use]
    pub fn detector(&self) -> Box<dyn ChangeDetector> {
        self.strategy.monitor()
    }

    /// Run one detection pass
    ///
    /// Loads the previous state if there is one, walks the configured roots,
    /// writes the new state and returns what changed.
    ///
    /// # Errors
    ///
    /// Returns an error if walking the roots or writing the state fails.
    pub fn run(&self) -> Result<ChangeSet> {
        let mut detector = self.detector();
        if !detector.load(&self.state_file) {
            debug!(
                "No usable previous state at {}, treating every file as created",
                self.state_file.display()
            );
        }

        detector.update(&self.paths)?;
        detector.write(&self.state_file)?;
        Ok(detector.changed_files())
    }
}
