//! Platform detection
//!
//! The inventory scanner reads macOS bundles and freedesktop `.desktop`
//! entries; this reports which flavor is active and where state lives.

use std::env;

use launchpad_core::LauncherConfig;

/// Program packaging convention on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// `.app` bundles with `Contents/Info.plist`
    Bundles,
    /// freedesktop `.desktop` entries
    DesktopEntries,
}

impl Packaging {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Packaging::Bundles
        } else {
            Packaging::DesktopEntries
        }
    }
}

impl std::fmt::Display for Packaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Packaging::Bundles => write!(f, "app bundles"),
            Packaging::DesktopEntries => write!(f, "desktop entries"),
        }
    }
}

/// Log platform information at startup
pub fn log_platform_info(config: &LauncherConfig) {
    tracing::info!(packaging = %Packaging::detect(), "Program packaging detected");
    tracing::debug!(roots = ?config.scan.roots, max_depth = config.scan.max_depth, "Scan roots");

    match config.state_path() {
        Ok(path) => tracing::debug!(path = %path.display(), backend = ?config.storage.backend, "State location"),
        Err(e) => tracing::warn!(error = %e, "Could not resolve state location"),
    }

    if let Ok(dirs) = env::var("XDG_DATA_DIRS") {
        tracing::debug!(xdg_data_dirs = %dirs, "XDG data dirs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaging_display() {
        assert_eq!(format!("{}", Packaging::Bundles), "app bundles");
        assert_eq!(format!("{}", Packaging::DesktopEntries), "desktop entries");
    }

    #[test]
    fn packaging_matches_target() {
        let packaging = Packaging::detect();
        if cfg!(target_os = "macos") {
            assert_eq!(packaging, Packaging::Bundles);
        } else {
            assert_eq!(packaging, Packaging::DesktopEntries);
        }
    }
}
