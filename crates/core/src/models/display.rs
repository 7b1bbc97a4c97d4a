//! Display projections (derived, never persisted)

use super::{Entry, Program};

/// A folder materialized against the live program table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFolder {
    pub id: String,
    pub name: String,
    pub apps: Vec<Program>,
}

/// One rendered tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEntry {
    App(Program),
    Folder(DisplayFolder),
}

impl DisplayEntry {
    /// The layout entry this tile was materialized from
    pub fn entry(&self) -> Entry {
        match self {
            DisplayEntry::App(program) => Entry::App(program.id.clone()),
            DisplayEntry::Folder(folder) => Entry::Folder(folder.id.clone()),
        }
    }

    /// Boundary id, `app:<id>` or `folder:<id>`
    pub fn id(&self) -> String {
        self.entry().to_string()
    }

    pub fn title(&self) -> &str {
        match self {
            DisplayEntry::App(program) => &program.name,
            DisplayEntry::Folder(folder) => &folder.name,
        }
    }
}
