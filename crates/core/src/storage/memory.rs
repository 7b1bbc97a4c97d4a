//! In-process state repository

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::models::LauncherState;

use super::StateRepository;

/// Shared in-memory repository
///
/// Clones share the same slot, so a caller can keep a handle to inspect what
/// the store saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    slot: Arc<Mutex<Option<LauncherState>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LauncherState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }

    /// Last saved state
    pub fn snapshot(&self) -> Option<LauncherState> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl StateRepository for MemoryRepository {
    fn load(&self) -> Result<Option<LauncherState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| Error::Unavailable("memory repository poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &LauncherState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Unavailable("memory repository poisoned".into()))?;
        *slot = Some(state.clone());
        Ok(())
    }
}
