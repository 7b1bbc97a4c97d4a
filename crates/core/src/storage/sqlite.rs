//! SQLite persistence
//!
//! Stores launcher state in normalized tables: scalar fields in
//! `launcher_meta` (JSON-encoded values keyed by their document names),
//! top-level slots in `launcher_entries`, folders and their ordered members
//! in `launcher_folders` / `launcher_folder_members`. Each save replaces the
//! whole snapshot inside one transaction.

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::{Entry, Folder, LauncherState, SCHEMA_VERSION};

use super::migrations;
use super::parse::{entry_kind, parse_datetime, parse_entry};
use super::StateRepository;

const KEY_SCHEMA_VERSION: &str = "schemaVersion";
const KEY_CREATED_AT: &str = "createdAt";
const KEY_UPDATED_AT: &str = "updatedAt";

/// Launcher state stored in a SQLite database
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Get current database schema version
    pub fn schema_version(&self) -> u32 {
        migrations::get_current_version(&self.conn).unwrap_or(0)
    }

    fn load_meta(&self) -> Result<Map<String, Value>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM launcher_meta")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut meta = Map::new();
        for row in rows {
            let (key, value) = row?;
            meta.insert(key, serde_json::from_str(&value)?);
        }
        Ok(meta)
    }

    fn load_entries(&self) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, ref_id FROM launcher_entries ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(0)?;
            parse_entry(&kind, row.get(1)?)
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn load_folders(&self) -> Result<BTreeMap<String, Folder>> {
        let mut folders = BTreeMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM launcher_folders")?;
        let rows = stmt.query_map([], |row| {
            Ok(Folder {
                id: row.get(0)?,
                name: row.get(1)?,
                member_ids: Vec::new(),
                created_at: parse_datetime(&row.get::<_, String>(2)?)?,
            })
        })?;
        for row in rows {
            let folder = row?;
            folders.insert(folder.id.clone(), folder);
        }

        let mut stmt = self.conn.prepare(
            "SELECT folder_id, program_id FROM launcher_folder_members
             ORDER BY folder_id, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (folder_id, program_id) = row?;
            if let Some(folder) = folders.get_mut(&folder_id) {
                folder.member_ids.push(program_id);
            }
        }

        Ok(folders)
    }
}

fn take_field<T: DeserializeOwned>(meta: &mut Map<String, Value>, key: &str) -> Result<T> {
    let value = meta
        .remove(key)
        .ok_or_else(|| Error::Corrupt(format!("missing {}", key)))?;
    Ok(serde_json::from_value(value)?)
}

impl StateRepository for SqliteRepository {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<LauncherState>> {
        let mut meta = self.load_meta()?;
        if meta.is_empty() {
            debug!("No saved launcher state");
            return Ok(None);
        }

        let schema_version: u32 = take_field(&mut meta, KEY_SCHEMA_VERSION)?;
        if schema_version > SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema(schema_version));
        }

        Ok(Some(LauncherState {
            schema_version,
            created_at: take_field(&mut meta, KEY_CREATED_AT)?,
            updated_at: take_field(&mut meta, KEY_UPDATED_AT)?,
            ordered_entries: self.load_entries()?,
            folders: self.load_folders()?,
            extra: meta,
        }))
    }

    #[instrument(skip(self, state))]
    fn save(&self, state: &LauncherState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM launcher_meta", [])?;
        tx.execute("DELETE FROM launcher_entries", [])?;
        tx.execute("DELETE FROM launcher_folders", [])?;

        let mut meta: Vec<(String, String)> = vec![
            (
                KEY_SCHEMA_VERSION.to_string(),
                serde_json::to_string(&state.schema_version)?,
            ),
            (
                KEY_CREATED_AT.to_string(),
                serde_json::to_string(&state.created_at)?,
            ),
            (
                KEY_UPDATED_AT.to_string(),
                serde_json::to_string(&state.updated_at)?,
            ),
        ];
        for (key, value) in &state.extra {
            meta.push((key.clone(), serde_json::to_string(value)?));
        }
        for (key, value) in &meta {
            tx.execute(
                "INSERT INTO launcher_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        for (position, entry) in state.ordered_entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO launcher_entries (position, kind, ref_id) VALUES (?1, ?2, ?3)",
                params![position as i64, entry_kind(entry), entry.raw_id()],
            )?;
        }

        for folder in state.folders.values() {
            tx.execute(
                "INSERT INTO launcher_folders (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![folder.id, folder.name, folder.created_at.to_rfc3339()],
            )?;
            for (position, program_id) in folder.member_ids.iter().enumerate() {
                tx.execute(
                    "INSERT INTO launcher_folder_members (folder_id, position, program_id)
                     VALUES (?1, ?2, ?3)",
                    params![folder.id, position as i64, program_id],
                )?;
            }
        }

        tx.commit()?;
        debug!(entries = state.ordered_entries.len(), "Launcher state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> LauncherState {
        let mut state = LauncherState::empty()
            .with_entries(vec![Entry::app("c"), Entry::folder("f1"), Entry::app("d")])
            .with_folder(
                Folder::new("Tools".into(), vec!["b".into(), "a".into(), "e".into()]).with_id("f1"),
            );
        state.extra.insert("theme".into(), serde_json::json!({"accent": "green"}));
        state
    }

    #[test]
    fn test_empty_database_loads_none() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert!(repo.load().unwrap().is_none());
        assert!(repo.schema_version() >= 1);
    }

    #[test]
    fn test_save_load_preserves_order_and_extra_fields() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let state = sample_state();
        repo.save(&state).unwrap();

        let loaded = repo.load().unwrap().unwrap();
        assert_eq!(loaded.ordered_entries, state.ordered_entries);
        assert_eq!(loaded.folders["f1"].member_ids, vec!["b", "a", "e"]);
        assert_eq!(loaded.extra["theme"]["accent"], "green");
        assert_eq!(loaded.created_at, state.created_at);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.save(&sample_state()).unwrap();

        let smaller = LauncherState::empty().with_entries(vec![Entry::app("z")]);
        repo.save(&smaller).unwrap();

        let loaded = repo.load().unwrap().unwrap();
        assert_eq!(loaded.ordered_entries, vec![Entry::app("z")]);
        assert!(loaded.folders.is_empty());
        assert!(loaded.extra.is_empty());
    }

    #[test]
    fn test_reopen_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("launcher.db");

        SqliteRepository::open(&path)
            .unwrap()
            .save(&sample_state())
            .unwrap();

        let loaded = SqliteRepository::open(&path).unwrap().load().unwrap().unwrap();
        assert_eq!(loaded.ordered_entries.len(), 3);
    }

    #[test]
    fn test_future_schema_rejected() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let mut state = sample_state();
        state.schema_version = SCHEMA_VERSION + 1;
        repo.save(&state).unwrap();

        assert!(matches!(repo.load(), Err(Error::UnsupportedSchema(_))));
    }
}
