//! Plain-text rendering of launcher snapshots

use std::fmt::Write;

use launchpad_core::{DisplayEntry, DisplayFolder, Folder, LauncherSnapshot, Program};

/// One grid page, or every page when `page` is `None` (pages are 1-based)
pub fn render_pages(snapshot: &LauncherSnapshot, page: Option<usize>) -> String {
    let mut out = String::new();
    let total = snapshot.pages.len();

    if total == 0 {
        out.push_str("No programs\n");
        return out;
    }

    for (index, entries) in snapshot.pages.iter().enumerate() {
        let number = index + 1;
        if page.is_some_and(|p| p != number) {
            continue;
        }
        let _ = writeln!(out, "Page {}/{}", number, total);
        for entry in entries {
            let _ = writeln!(out, "  {}", render_entry(entry));
        }
    }

    if let Some(page) = page {
        if page == 0 || page > total {
            let _ = writeln!(out, "No page {} (1-{})", page, total);
        }
    }
    out
}

fn render_entry(entry: &DisplayEntry) -> String {
    match entry {
        DisplayEntry::App(program) => format!("{:<24} {}", program.name, entry.id()),
        DisplayEntry::Folder(folder) => format!(
            "[{}] ({} apps) {}",
            folder.name,
            folder.apps.len(),
            entry.id()
        ),
    }
}

pub fn render_programs(programs: &[Program]) -> String {
    if programs.is_empty() {
        return "No matches\n".to_string();
    }
    let mut out = String::new();
    for program in programs {
        let _ = writeln!(out, "{:<24} {}", program.name, program.path);
    }
    out
}

pub fn render_folders(folders: &[Folder]) -> String {
    if folders.is_empty() {
        return "No folders\n".to_string();
    }
    let mut out = String::new();
    for folder in folders {
        let _ = writeln!(
            out,
            "{:<24} folder:{} ({} apps)",
            folder.name,
            folder.id,
            folder.member_ids.len()
        );
    }
    out
}

pub fn render_folder(folder: &DisplayFolder) -> String {
    let mut out = format!("[{}] folder:{}\n", folder.name, folder.id);
    for program in &folder.apps {
        let _ = writeln!(out, "  {:<22} app:{}", program.name, program.id);
    }
    out
}
