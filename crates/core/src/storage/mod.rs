//! Persistence layer for launcher state

mod json;
mod memory;
mod migrations;
mod parse;
mod sqlite;
mod traits;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use json::{parse_state, JsonFileRepository};
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
pub use traits::StateRepository;

/// Which repository backs the launcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    /// Default file name under the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            StorageBackend::Json => "launcher-state.json",
            StorageBackend::Sqlite => "launcher-state.db",
        }
    }

    /// Open the repository for this backend at `path`
    pub fn open(&self, path: PathBuf) -> Result<Box<dyn StateRepository>> {
        Ok(match self {
            StorageBackend::Json => Box::new(JsonFileRepository::new(path)),
            StorageBackend::Sqlite => Box::new(SqliteRepository::open(path)?),
        })
    }
}
