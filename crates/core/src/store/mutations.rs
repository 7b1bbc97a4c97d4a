//! Layout mutations
//!
//! Every mutation either leaves the state untouched (and does not save) or
//! applies a complete change and saves once.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Entry, Folder, LauncherState, MIN_FOLDER_MEMBERS};

use super::LauncherStore;

/// A layout change, as a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MoveEntry { dragged: Entry, before: Entry },
    CreateFolder { name: String, program_ids: Vec<String> },
    CreateFolderFromTopLevel { first: String, second: String, name: Option<String> },
    RenameFolder { folder_id: String, name: String },
    AddAppToFolder { program_id: String, folder_id: String },
    RemoveAppFromFolder { program_id: String, folder_id: String },
    DissolveFolder { folder_id: String },
    HandleDrop { dragged: Entry, target: Entry },
    EnsureAppOnTopLevel { program_id: String },
}

/// Remove programs from wherever they are placed.
///
/// Folders left with fewer than two members collapse in place: a single
/// survivor takes the folder's slot, an empty folder disappears. Returns the
/// slot the first removed top-level entry occupied in the resulting sequence.
fn detach(state: &mut LauncherState, program_ids: &[String]) -> Option<usize> {
    let mut entries = Vec::with_capacity(state.ordered_entries.len());
    let mut first_hole = None;

    for entry in std::mem::take(&mut state.ordered_entries) {
        match entry {
            Entry::App(id) if program_ids.contains(&id) => {
                first_hole.get_or_insert(entries.len());
            }
            Entry::Folder(folder_id) => {
                let Some(folder) = state.folders.get_mut(&folder_id) else {
                    entries.push(Entry::Folder(folder_id));
                    continue;
                };
                folder.member_ids.retain(|id| !program_ids.contains(id));
                if folder.is_viable() {
                    entries.push(Entry::Folder(folder_id));
                    continue;
                }

                let survivor = folder.member_ids.first().cloned();
                state.folders.remove(&folder_id);
                debug!(folder_id = %folder_id, "Collapsed folder below minimum size");
                if let Some(survivor) = survivor {
                    entries.push(Entry::App(survivor));
                }
            }
            other => entries.push(other),
        }
    }

    state.ordered_entries = entries;
    first_hole
}

impl LauncherStore {
    /// Apply a mutation value; returns whether the state changed
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        match mutation {
            Mutation::MoveEntry { dragged, before } => self.move_entry(&dragged, &before),
            Mutation::CreateFolder { name, program_ids } => {
                self.create_folder(&name, &program_ids).is_some()
            }
            Mutation::CreateFolderFromTopLevel { first, second, name } => {
                let name = name.unwrap_or_else(|| self.default_folder_name.clone());
                self.create_folder_from_top_level(&first, &second, &name)
                    .is_some()
            }
            Mutation::RenameFolder { folder_id, name } => self.rename_folder(&folder_id, &name),
            Mutation::AddAppToFolder { program_id, folder_id } => {
                self.add_app_to_folder(&program_id, &folder_id)
            }
            Mutation::RemoveAppFromFolder { program_id, folder_id } => {
                self.remove_app_from_folder(&program_id, &folder_id)
            }
            Mutation::DissolveFolder { folder_id } => self.dissolve_folder(&folder_id),
            Mutation::HandleDrop { dragged, target } => self.handle_drop(&dragged, &target),
            Mutation::EnsureAppOnTopLevel { program_id } => {
                self.ensure_app_on_top_level(&program_id)
            }
        }
    }

    /// Move a top-level entry so it sits immediately before `before`
    pub fn move_entry(&mut self, dragged: &Entry, before: &Entry) -> bool {
        if dragged == before {
            return false;
        }
        let (Some(from), Some(to)) = (self.state.position(dragged), self.state.position(before))
        else {
            return false;
        };

        let entries = &mut self.state.ordered_entries;
        let moving = entries.remove(from);
        let to = if to > from { to - 1 } else { to };
        entries.insert(to.min(entries.len()), moving);

        self.touch_and_save();
        true
    }

    /// Group known programs into a new folder.
    ///
    /// Members are ordered by their current top-level position; programs not
    /// at the top level follow in input order. The folder takes the slot of
    /// the earliest member found at the top level, or is appended.
    pub fn create_folder(&mut self, name: &str, program_ids: &[String]) -> Option<String> {
        let mut members: Vec<String> = Vec::with_capacity(program_ids.len());
        for id in program_ids {
            if self.programs_by_id.contains_key(id) && !members.contains(id) {
                members.push(id.clone());
            }
        }
        if members.len() < MIN_FOLDER_MEMBERS {
            return None;
        }

        {
            let top_level: HashMap<&str, usize> = self
                .state
                .ordered_entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| match entry {
                    Entry::App(id) => Some((id.as_str(), index)),
                    Entry::Folder(_) => None,
                })
                .collect();
            // Stable sort keeps input order among equal keys
            members.sort_by_key(|id| top_level.get(id.as_str()).copied().unwrap_or(usize::MAX));
        }

        let slot = detach(&mut self.state, &members);
        let folder = Folder::new(name.to_string(), members);
        let folder_id = folder.id.clone();

        let entries = &mut self.state.ordered_entries;
        let slot = slot.unwrap_or(entries.len()).min(entries.len());
        entries.insert(slot, Entry::Folder(folder_id.clone()));
        self.state.folders.insert(folder_id.clone(), folder);

        debug!(folder_id = %folder_id, slot, "Created folder");
        self.touch_and_save();
        Some(folder_id)
    }

    /// Fold two top-level programs into a new two-member folder
    pub fn create_folder_from_top_level(
        &mut self,
        first_id: &str,
        second_id: &str,
        name: &str,
    ) -> Option<String> {
        if first_id == second_id {
            return None;
        }
        let first = self.state.position(&Entry::app(first_id))?;
        let second = self.state.position(&Entry::app(second_id))?;
        let slot = first.min(second);

        self.state
            .ordered_entries
            .retain(|entry| !matches!(entry, Entry::App(id) if id == first_id || id == second_id));

        let folder = Folder::new(
            name.to_string(),
            vec![first_id.to_string(), second_id.to_string()],
        );
        let folder_id = folder.id.clone();
        self.state
            .ordered_entries
            .insert(slot, Entry::Folder(folder_id.clone()));
        self.state.folders.insert(folder_id.clone(), folder);

        self.touch_and_save();
        Some(folder_id)
    }

    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> bool {
        let Some(folder) = self.state.folders.get_mut(folder_id) else {
            return false;
        };
        folder.name = name.to_string();
        self.touch_and_save();
        true
    }

    /// Move a program into a folder, appending it to the member list
    pub fn add_app_to_folder(&mut self, program_id: &str, folder_id: &str) -> bool {
        if !self.programs_by_id.contains_key(program_id) {
            return false;
        }
        match self.state.folders.get(folder_id) {
            Some(folder) if !folder.contains(program_id) => {}
            _ => return false,
        }

        detach(&mut self.state, &[program_id.to_string()]);
        if let Some(folder) = self.state.folders.get_mut(folder_id) {
            folder.member_ids.push(program_id.to_string());
        }

        let entry = Entry::folder(folder_id);
        if self.state.position(&entry).is_none() {
            self.state.ordered_entries.push(entry);
        }

        self.touch_and_save();
        true
    }

    /// Take a program out of a folder and place it at the top level.
    ///
    /// The removed program lands right after the folder's slot. A folder left
    /// with one member is replaced by that member; an emptied folder is
    /// replaced by the removed program.
    pub fn remove_app_from_folder(&mut self, program_id: &str, folder_id: &str) -> bool {
        let Some(slot) = self.state.position(&Entry::folder(folder_id)) else {
            return false;
        };
        let Some(folder) = self.state.folders.get_mut(folder_id) else {
            return false;
        };
        if !folder.contains(program_id) {
            return false;
        }

        folder.member_ids.retain(|id| id != program_id);
        let remaining = folder.member_ids.len();
        let survivor = folder.member_ids.first().cloned();
        let removed = Entry::app(program_id);
        let entries = &mut self.state.ordered_entries;

        if remaining >= MIN_FOLDER_MEMBERS {
            entries.insert(slot + 1, removed);
        } else {
            self.state.folders.remove(folder_id);
            match survivor {
                Some(survivor) => {
                    entries[slot] = Entry::App(survivor);
                    entries.insert(slot + 1, removed);
                }
                None => entries[slot] = removed,
            }
        }

        self.touch_and_save();
        true
    }

    /// Replace a folder with its members, in member order
    pub fn dissolve_folder(&mut self, folder_id: &str) -> bool {
        let Some(slot) = self.state.position(&Entry::folder(folder_id)) else {
            return false;
        };
        let Some(folder) = self.state.folders.remove(folder_id) else {
            return false;
        };

        self.state
            .ordered_entries
            .splice(slot..=slot, folder.member_ids.into_iter().map(Entry::App));

        self.touch_and_save();
        true
    }

    /// Resolve a drag of `dragged` onto `target`
    pub fn handle_drop(&mut self, dragged: &Entry, target: &Entry) -> bool {
        if dragged == target {
            return false;
        }

        match (dragged, target) {
            (Entry::App(program_id), Entry::Folder(folder_id)) => {
                self.add_app_to_folder(program_id, folder_id)
            }
            (Entry::App(first), Entry::App(second)) => {
                let name = self.default_folder_name.clone();
                self.create_folder_from_top_level(first, second, &name)
                    .is_some()
            }
            _ => self.move_entry(dragged, target),
        }
    }

    /// Pull a program out of any folder and append it to the top level
    pub fn ensure_app_on_top_level(&mut self, program_id: &str) -> bool {
        if !self.programs_by_id.contains_key(program_id) {
            return false;
        }

        detach(&mut self.state, &[program_id.to_string()]);
        self.state.ordered_entries.push(Entry::app(program_id));

        self.touch_and_save();
        true
    }
}
