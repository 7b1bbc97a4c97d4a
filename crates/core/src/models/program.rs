//! Installed program model

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A program discovered by the inventory scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Package identifier if known, otherwise `path:<path>`
    pub id: String,
    pub name: String,
    pub package_id: Option<String>,
    pub path: String,
    pub is_system: bool,
}

impl Program {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            package_id: None,
            path: path.into(),
            is_system: false,
        }
    }

    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Fallback identifier for programs without a package identifier
    pub fn path_id(path: &str) -> String {
        format!("path:{}", path)
    }
}

/// Case-insensitive ordering used everywhere names are sorted
pub fn compare_names(lhs: &str, rhs: &str) -> Ordering {
    lhs.to_lowercase()
        .cmp(&rhs.to_lowercase())
        .then_with(|| lhs.cmp(rhs))
}
