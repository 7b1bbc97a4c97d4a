//! Launcher folder model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest membership a folder may keep before it is collapsed
pub const MIN_FOLDER_MEMBERS: usize = 2;

/// A named group of programs occupying one top-level slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Ordered program ids, no duplicates
    #[serde(rename = "appIDs", alias = "memberIds")]
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, member_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            member_ids,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn contains(&self, program_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == program_id)
    }

    /// Whether the folder may stand on its own
    pub fn is_viable(&self) -> bool {
        self.member_ids.len() >= MIN_FOLDER_MEMBERS
    }
}
