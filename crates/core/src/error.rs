//! Error types for Launchpad Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(u32),

    #[error("Invalid entry reference: {0}")]
    InvalidEntryRef(String),

    #[error("Corrupt state: {0}")]
    Corrupt(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal failures surfaced by the launcher store
///
/// The store keeps its last good in-memory state whenever one of these occurs.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not scan installed programs: {0}")]
    Scan(#[source] Error),

    #[error("Could not load launcher state: {0}")]
    Load(#[source] Error),

    #[error("Could not save launcher state: {0}")]
    Save(#[source] Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Scan(_) => "scan",
            StoreError::Load(_) => "load",
            StoreError::Save(_) => "save",
        }
    }
}
