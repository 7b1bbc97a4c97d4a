//! Developer guardrails and invariants
//!
//! Structural checks for launcher state. `check_state` reports every
//! violation; `assert_state_invariants` turns them into debug assertions that
//! are compiled out in release builds.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Entry, LauncherState, MIN_FOLDER_MEMBERS};

/// A broken state invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Program referenced more than once across top level and folders
    DuplicateProgram(String),
    /// Folder entry with no folder record
    MissingFolderRecord(String),
    /// Folder record with no top-level entry
    OrphanedFolder(String),
    /// Folder entry listed more than once at top level
    DuplicateFolderEntry(String),
    /// Folder below the minimum membership
    UndersizedFolder { folder_id: String, members: usize },
    /// Reference to a program that is not installed
    UnknownProgram(String),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateProgram(id) => write!(f, "program {} is placed more than once", id),
            Self::MissingFolderRecord(id) => write!(f, "folder entry {} has no record", id),
            Self::OrphanedFolder(id) => write!(f, "folder {} has no top-level entry", id),
            Self::DuplicateFolderEntry(id) => write!(f, "folder {} is listed more than once", id),
            Self::UndersizedFolder { folder_id, members } => {
                write!(f, "folder {} has only {} member(s)", folder_id, members)
            }
            Self::UnknownProgram(id) => write!(f, "program {} is not installed", id),
        }
    }
}

/// Collect every invariant violation in `state`
pub fn check_state(
    state: &LauncherState,
    is_known: impl Fn(&str) -> bool,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut placed: HashSet<String> = HashSet::new();
    let mut listed_folders: HashSet<&str> = HashSet::new();

    let mut place = |id: &str, violations: &mut Vec<InvariantViolation>| {
        if !placed.insert(id.to_string()) {
            violations.push(InvariantViolation::DuplicateProgram(id.to_string()));
        }
        if !is_known(id) {
            violations.push(InvariantViolation::UnknownProgram(id.to_string()));
        }
    };

    for entry in &state.ordered_entries {
        match entry {
            Entry::App(id) => place(id, &mut violations),
            Entry::Folder(folder_id) => {
                if !listed_folders.insert(folder_id) {
                    violations.push(InvariantViolation::DuplicateFolderEntry(folder_id.clone()));
                    continue;
                }
                let Some(folder) = state.folders.get(folder_id) else {
                    violations.push(InvariantViolation::MissingFolderRecord(folder_id.clone()));
                    continue;
                };
                for id in &folder.member_ids {
                    place(id, &mut violations);
                }
            }
        }
    }

    for (folder_id, folder) in &state.folders {
        if !listed_folders.contains(folder_id.as_str()) {
            violations.push(InvariantViolation::OrphanedFolder(folder_id.clone()));
        }
        if folder.member_ids.len() < MIN_FOLDER_MEMBERS {
            violations.push(InvariantViolation::UndersizedFolder {
                folder_id: folder_id.clone(),
                members: folder.member_ids.len(),
            });
        }
    }

    violations
}

/// Validate that a launcher state is internally consistent
pub fn assert_state_invariants(state: &LauncherState, is_known: impl Fn(&str) -> bool) {
    if cfg!(debug_assertions) {
        let violations = check_state(state, is_known);
        debug_assert!(
            violations.is_empty(),
            "Launcher state invariants violated: {}",
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
}
