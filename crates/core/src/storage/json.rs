//! JSON file persistence
//!
//! Stores the launcher state as a single pretty-printed JSON document.
//! Writes go to a sibling temp file first and are renamed into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::{LauncherState, SCHEMA_VERSION};

use super::StateRepository;

/// Launcher state stored in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "launcher-state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parse a state document, rejecting newer schema versions
pub fn parse_state(raw: &str) -> Result<LauncherState> {
    let state: LauncherState = serde_json::from_str(raw)?;
    if state.schema_version > SCHEMA_VERSION {
        return Err(Error::UnsupportedSchema(state.schema_version));
    }
    Ok(state)
}

impl StateRepository for JsonFileRepository {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<LauncherState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved launcher state");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        parse_state(&raw).map(Some)
    }

    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    fn save(&self, state: &LauncherState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        fs::write(&temp, data)?;
        fs::rename(&temp, &self.path)?;

        debug!(entries = state.ordered_entries.len(), "Launcher state saved");
        Ok(())
    }
}
