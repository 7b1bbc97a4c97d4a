//! Filesystem program scanner

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::Program;

use super::metadata::{parse_desktop_entry, parse_info_plist};
use super::{dedupe_programs, InventoryProvider};

/// Walks application directories collecting `.app` bundles and `.desktop` entries
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    roots: Vec<PathBuf>,
    system_roots: Vec<PathBuf>,
    max_depth: usize,
}

impl DirectoryScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            system_roots: Vec::new(),
            max_depth: 3,
        }
    }

    /// Paths under these prefixes are marked as system programs
    pub fn with_system_roots(mut self, system_roots: Vec<PathBuf>) -> Self {
        self.system_roots = system_roots;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn is_system_path(&self, path: &Path) -> bool {
        self.system_roots.iter().any(|root| path.starts_with(root))
    }

    fn collect(&self, dir: &Path, depth: usize, found: &mut Vec<Program>) -> Result<()> {
        if depth > self.max_depth {
            return Ok(());
        }

        let items = match fs::read_dir(dir) {
            Ok(items) => items,
            Err(e) if depth == 0 => {
                return Err(Error::Scan(format!("{}: {}", dir.display(), e)));
            }
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                return Ok(());
            }
        };

        for item in items.flatten() {
            let path = item.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |n| n.starts_with('.'));
            if hidden {
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);

            match extension.as_deref() {
                Some("app") => {
                    found.push(self.read_bundle(&path));
                    continue;
                }
                Some("desktop") => {
                    if let Some(program) = self.read_desktop_file(&path) {
                        found.push(program);
                    }
                    continue;
                }
                _ => {}
            }

            if depth < self.max_depth && path.is_dir() {
                self.collect(&path, depth + 1, found)?;
            }
        }

        Ok(())
    }

    fn read_bundle(&self, path: &Path) -> Program {
        let path_str = path.to_string_lossy().into_owned();
        let info = fs::read_to_string(path.join("Contents").join("Info.plist"))
            .map(|xml| parse_info_plist(&xml))
            .unwrap_or_default();

        let name = info
            .display_name
            .or(info.name)
            .unwrap_or_else(|| file_stem(path));
        let id = info
            .identifier
            .clone()
            .unwrap_or_else(|| Program::path_id(&path_str));

        Program {
            id,
            name,
            package_id: info.identifier,
            is_system: self.is_system_path(path),
            path: path_str,
        }
    }

    fn read_desktop_file(&self, path: &Path) -> Option<Program> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unreadable desktop entry");
                return None;
            }
        };

        let info = parse_desktop_entry(&contents);
        if !info.is_launchable() {
            return None;
        }

        let desktop_id = file_stem(path);
        Some(Program {
            id: desktop_id.clone(),
            name: info.name.unwrap_or_else(|| desktop_id.clone()),
            package_id: Some(desktop_id),
            is_system: self.is_system_path(path),
            path: path.to_string_lossy().into_owned(),
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl InventoryProvider for DirectoryScanner {
    #[instrument(skip(self), fields(roots = self.roots.len()))]
    fn scan(&self) -> Result<Vec<Program>> {
        let mut found = Vec::new();

        for root in &self.roots {
            if !root.exists() {
                debug!(root = %root.display(), "Scan root does not exist");
                continue;
            }
            if let Err(e) = self.collect(root, 0, &mut found) {
                warn!(root = %root.display(), error = %e, "Scan root unreadable");
                return Err(e);
            }
        }

        let programs = dedupe_programs(found);
        info!(programs = programs.len(), "Inventory scan complete");
        Ok(programs)
    }
}
