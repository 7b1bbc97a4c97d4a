//! Storage repository traits
//!
//! These traits define the persistence interface for launcher state,
//! allowing for different implementations (JSON file, SQLite, in-memory).

use crate::error::Result;
use crate::models::LauncherState;

/// Launcher state persistence
pub trait StateRepository: Send {
    /// Load the saved state, `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<LauncherState>>;

    /// Replace the saved state
    fn save(&self, state: &LauncherState) -> Result<()>;
}

impl<T: StateRepository + ?Sized> StateRepository for Box<T> {
    fn load(&self) -> Result<Option<LauncherState>> {
        (**self).load()
    }

    fn save(&self, state: &LauncherState) -> Result<()> {
        (**self).save(state)
    }
}
