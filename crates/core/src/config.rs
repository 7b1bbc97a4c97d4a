//! Launcher configuration
//!
//! Loaded from a TOML file, every field optional:
//!
//! ```toml
//! page_size = 35
//! default_folder_name = "New Folder"
//!
//! [storage]
//! backend = "json"        # or "sqlite"
//! path = "/path/to/launcher-state.json"
//!
//! [scan]
//! roots = ["/Applications"]
//! system_roots = ["/System"]
//! max_depth = 3
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::inventory::DirectoryScanner;
use crate::storage::{StateRepository, StorageBackend};

pub const DEFAULT_PAGE_SIZE: usize = 35;
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";
pub const DEFAULT_SCAN_DEPTH: usize = 3;

/// Top-level launcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Tiles per grid page
    pub page_size: usize,
    /// Name given to folders created by dropping one program onto another
    pub default_folder_name: String,
    pub storage: StorageConfig,
    pub scan: ScanConfig,
}

/// Where launcher state is persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Defaults to the platform data directory
    pub path: Option<PathBuf>,
}

/// Which directories the inventory scan walks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub roots: Vec<PathBuf>,
    pub system_roots: Vec<PathBuf>,
    pub max_depth: usize,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_folder_name: DEFAULT_FOLDER_NAME.to_string(),
            storage: StorageConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

        let (mut roots, system_roots): (Vec<PathBuf>, Vec<PathBuf>) = if cfg!(target_os = "macos") {
            (
                vec![
                    "/Applications".into(),
                    "/System/Applications".into(),
                    "/System/Applications/Utilities".into(),
                ],
                vec!["/System".into()],
            )
        } else {
            (
                vec![
                    "/usr/share/applications".into(),
                    "/usr/local/share/applications".into(),
                    "/var/lib/flatpak/exports/share/applications".into(),
                ],
                vec!["/usr/share".into()],
            )
        };

        if let Some(home) = home {
            if cfg!(target_os = "macos") {
                roots.push(home.join("Applications"));
            } else {
                roots.push(home.join(".local/share/applications"));
            }
        }

        Self {
            roots,
            system_roots,
            max_depth: DEFAULT_SCAN_DEPTH,
        }
    }
}

impl LauncherConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Resolved state file location
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?
                .data_dir()
                .join(self.storage.backend.file_name())),
        }
    }

    /// Open the configured state repository
    pub fn open_repository(&self) -> Result<Box<dyn StateRepository>> {
        self.storage.backend.open(self.state_path()?)
    }

    /// Build the configured inventory scanner
    pub fn scanner(&self) -> DirectoryScanner {
        DirectoryScanner::new(self.scan.roots.clone())
            .with_system_roots(self.scan.system_roots.clone())
            .with_max_depth(self.scan.max_depth)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "launchpad", "launchpad").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LauncherConfig::from_toml("").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.default_folder_name, DEFAULT_FOLDER_NAME);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.scan.max_depth, DEFAULT_SCAN_DEPTH);
        assert!(!config.scan.roots.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = LauncherConfig::from_toml(
            r#"
            page_size = 20
            default_folder_name = "Untitled"

            [storage]
            backend = "sqlite"
            path = "/tmp/launchpad/state.db"

            [scan]
            roots = ["/opt/apps"]
            system_roots = ["/opt/system"]
            max_depth = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.default_folder_name, "Untitled");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(
            config.state_path().unwrap(),
            PathBuf::from("/tmp/launchpad/state.db")
        );
        assert_eq!(config.scan.roots, vec![PathBuf::from("/opt/apps")]);
        assert_eq!(config.scan.max_depth, 1);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(matches!(
            LauncherConfig::from_toml("page_size = \"many\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::load_or_default(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, LauncherConfig::default());
    }
}
