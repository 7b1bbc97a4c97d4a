//! Program inventory
//!
//! The store only consumes a deduplicated, name-sorted program list;
//! `DirectoryScanner` is the filesystem-backed producer.

mod metadata;
mod scanner;

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{compare_names, Program};

pub use metadata::{parse_desktop_entry, parse_info_plist, BundleInfo, DesktopEntryInfo};
pub use scanner::DirectoryScanner;

/// Source of the installed program list
pub trait InventoryProvider: Send + Sync {
    /// Scan for installed programs, deduplicated by id and sorted by name
    fn scan(&self) -> Result<Vec<Program>>;
}

impl<F> InventoryProvider for F
where
    F: Fn() -> Result<Vec<Program>> + Send + Sync,
{
    fn scan(&self) -> Result<Vec<Program>> {
        self()
    }
}

/// Collapse duplicate ids and sort by name.
///
/// When two instances share an id the one outside a system location wins;
/// otherwise the first one seen is kept.
pub fn dedupe_programs(programs: impl IntoIterator<Item = Program>) -> Vec<Program> {
    let mut by_id: HashMap<String, Program> = HashMap::new();

    for program in programs {
        match by_id.get(&program.id) {
            Some(existing) if !(existing.is_system && !program.is_system) => {}
            _ => {
                by_id.insert(program.id.clone(), program);
            }
        }
    }

    let mut programs: Vec<Program> = by_id.into_values().collect();
    programs.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    programs
}
