//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, Utc};
use rusqlite::Error as SqlError;

use crate::models::Entry;

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> SqlError {
    SqlError::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

/// Rebuild a layout entry from its stored kind and id
pub fn parse_entry(kind: &str, ref_id: String) -> Result<Entry, SqlError> {
    match kind {
        "app" => Ok(Entry::App(ref_id)),
        "folder" => Ok(Entry::Folder(ref_id)),
        other => Err(conversion_error(
            1,
            crate::error::Error::InvalidEntryRef(format!("{}:{}", other, ref_id)),
        )),
    }
}

/// Stored kind for a layout entry
pub fn entry_kind(entry: &Entry) -> &'static str {
    match entry {
        Entry::App(_) => "app",
        Entry::Folder(_) => "folder",
    }
}
