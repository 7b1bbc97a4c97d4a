//! Read-only views over the store, recomputed on every access

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{
    compare_names, DisplayEntry, DisplayFolder, Entry, Folder, Program, MIN_FOLDER_MEMBERS,
};

use super::LauncherStore;

/// Everything a presentation layer needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LauncherSnapshot {
    pub pages: Vec<Vec<DisplayEntry>>,
    pub folders: Vec<Folder>,
    pub search_query: String,
    pub search_results: Vec<Program>,
    pub program_count: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Split `items` into order-preserving chunks of `size` (at least one)
pub fn chunked<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}

/// Case-insensitive substring search over name, path and package id.
///
/// Name-prefix matches rank first. An empty query matches nothing.
pub fn search_programs(programs: &[Program], query: &str) -> Vec<Program> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(bool, &Program)> = programs
        .iter()
        .filter_map(|program| {
            let name = program.name.to_lowercase();
            let matches = name.contains(&needle)
                || program.path.to_lowercase().contains(&needle)
                || program
                    .package_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase().contains(&needle));
            matches.then(|| (name.starts_with(&needle), program))
        })
        .collect();

    hits.sort_by(|(lhs_prefix, lhs), (rhs_prefix, rhs)| match (lhs_prefix, rhs_prefix) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&lhs.name, &rhs.name),
    });

    hits.into_iter().map(|(_, program)| program.clone()).collect()
}

impl LauncherStore {
    /// Materialize the layout against the live program table.
    ///
    /// Entries that no longer resolve are skipped, as are folders with fewer
    /// than two resolvable members.
    pub fn top_level_entries(&self) -> Vec<DisplayEntry> {
        self.state
            .ordered_entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::App(id) => self.program(id).cloned().map(DisplayEntry::App),
                Entry::Folder(id) => self
                    .folder_contents(id)
                    .filter(|folder| folder.apps.len() >= MIN_FOLDER_MEMBERS)
                    .map(DisplayEntry::Folder),
            })
            .collect()
    }

    /// Top-level entries split into grid pages
    pub fn paged_entries(&self) -> Vec<Vec<DisplayEntry>> {
        chunked(&self.top_level_entries(), self.page_size)
    }

    /// Programs matching the current search query
    pub fn search_results(&self) -> Vec<Program> {
        search_programs(&self.programs, &self.search_query)
    }

    /// All folders, by name
    pub fn all_folders(&self) -> Vec<Folder> {
        let mut folders: Vec<Folder> = self.state.folders.values().cloned().collect();
        folders.sort_by(|lhs, rhs| compare_names(&lhs.name, &rhs.name));
        folders
    }

    /// A folder with its resolvable members, in member order
    pub fn folder_contents(&self, folder_id: &str) -> Option<DisplayFolder> {
        let folder = self.state.folders.get(folder_id)?;
        Some(DisplayFolder {
            id: folder.id.clone(),
            name: folder.name.clone(),
            apps: folder
                .member_ids
                .iter()
                .filter_map(|id| self.program(id).cloned())
                .collect(),
        })
    }

    pub fn snapshot(&self) -> LauncherSnapshot {
        LauncherSnapshot {
            pages: self.paged_entries(),
            folders: self.all_folders(),
            search_query: self.search_query.clone(),
            search_results: self.search_results(),
            program_count: self.programs.len(),
            last_sync: self.last_sync,
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}
