//! Reconciliation of saved layout against a fresh program inventory
//!
//! Guarantees that every reference in the returned state points at a known
//! program, that no program is placed twice, and that every folder keeps at
//! least two members. Programs without a placement are appended at the end,
//! sorted by name.

use std::collections::{BTreeMap, HashSet};

use crate::models::{compare_names, Entry, Folder, LauncherState, Program};

/// Merge `state` with the current program inventory.
///
/// Pure and idempotent: reconciling the result again against the same
/// programs yields an equal state. `updated_at` is left untouched.
pub fn reconcile(state: &LauncherState, programs: &[Program]) -> LauncherState {
    let known: HashSet<&str> = programs.iter().map(|p| p.id.as_str()).collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut entries: Vec<Entry> = Vec::with_capacity(state.ordered_entries.len());
    let mut folders: BTreeMap<String, Folder> = BTreeMap::new();

    for entry in &state.ordered_entries {
        match entry {
            Entry::App(id) => {
                if known.contains(id.as_str()) && used.insert(id.clone()) {
                    entries.push(Entry::App(id.clone()));
                }
            }
            Entry::Folder(folder_id) => {
                // A folder listed twice keeps its first slot only
                if folders.contains_key(folder_id) {
                    continue;
                }
                let Some(folder) = state.folders.get(folder_id) else {
                    continue;
                };

                let mut members: Vec<String> = Vec::with_capacity(folder.member_ids.len());
                for id in &folder.member_ids {
                    if known.contains(id.as_str())
                        && !used.contains(id)
                        && !members.contains(id)
                    {
                        members.push(id.clone());
                    }
                }

                match members.len() {
                    0 => {}
                    1 => {
                        let survivor = members.remove(0);
                        used.insert(survivor.clone());
                        entries.push(Entry::App(survivor));
                    }
                    _ => {
                        used.extend(members.iter().cloned());
                        let mut kept = folder.clone();
                        // The map key is authoritative over a drifted record id
                        kept.id = folder_id.clone();
                        kept.member_ids = members;
                        folders.insert(folder_id.clone(), kept);
                        entries.push(Entry::Folder(folder_id.clone()));
                    }
                }
            }
        }
    }

    let mut unplaced: Vec<&Program> = programs
        .iter()
        .filter(|p| !used.contains(&p.id))
        .collect();
    unplaced.sort_by(|a, b| compare_names(&a.name, &b.name));

    for program in unplaced {
        // Duplicate ids in the inventory still place once
        if used.insert(program.id.clone()) {
            entries.push(Entry::App(program.id.clone()));
        }
    }

    LauncherState {
        schema_version: state.schema_version,
        ordered_entries: entries,
        folders,
        created_at: state.created_at,
        updated_at: state.updated_at,
        extra: state.extra.clone(),
    }
}
