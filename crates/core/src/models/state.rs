//! Persisted launcher state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Entry, Folder};

/// Current persisted schema version
pub const SCHEMA_VERSION: u32 = 1;

/// The whole persisted layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherState {
    pub schema_version: u32,
    pub ordered_entries: Vec<Entry>,
    pub folders: BTreeMap<String, Folder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fields written by newer builds, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LauncherState {
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            ordered_entries: Vec::new(),
            folders: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.ordered_entries = entries;
        self
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folders.insert(folder.id.clone(), folder);
        self
    }

    /// Top-level position of an entry
    pub fn position(&self, entry: &Entry) -> Option<usize> {
        self.ordered_entries.iter().position(|e| e == entry)
    }
}

impl Default for LauncherState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = r#"{
            "schemaVersion": 1,
            "orderedEntries": [{"type": "app", "value": "a"}],
            "folders": {},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z",
            "wallpaper": {"tint": "blue"}
        }"#;

        let state: LauncherState = serde_json::from_str(json).unwrap();
        assert_eq!(state.ordered_entries, vec![Entry::app("a")]);
        assert!(state.extra.contains_key("wallpaper"));

        let written = serde_json::to_value(&state).unwrap();
        assert_eq!(written["wallpaper"]["tint"], "blue");
    }

    #[test]
    fn test_folder_member_alias() {
        let json = r#"{
            "id": "f1",
            "name": "Tools",
            "memberIds": ["a", "b"],
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        let folder: Folder = serde_json::from_str(json).unwrap();
        assert_eq!(folder.member_ids, vec!["a", "b"]);

        let written = serde_json::to_value(&folder).unwrap();
        assert_eq!(written["appIDs"][1], "b");
    }
}
