//! Launcher store
//!
//! Owns the current layout and program snapshot, applies mutations, and saves
//! after every change. All failures are recorded in `last_error` and never
//! propagated: the in-memory state stays authoritative, and the next save
//! carries every change made since a failed one.
//!
//! The store is single-writer. Hosts that mutate it from several threads must
//! serialize the whole mutate-and-save cycle (see the app's store actor).

mod mutations;
mod projections;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{LauncherConfig, DEFAULT_FOLDER_NAME, DEFAULT_PAGE_SIZE};
use crate::error::{Result, StoreError};
use crate::invariants::assert_state_invariants;
use crate::inventory::InventoryProvider;
use crate::models::{LauncherState, Program};
use crate::reconcile::reconcile;
use crate::storage::StateRepository;

pub use mutations::Mutation;
pub use projections::{chunked, search_programs, LauncherSnapshot};

/// Stateful orchestrator for the launcher layout
pub struct LauncherStore {
    state: LauncherState,
    programs: Vec<Program>,
    programs_by_id: HashMap<String, Program>,
    search_query: String,
    last_sync: Option<DateTime<Utc>>,
    last_error: Option<StoreError>,
    page_size: usize,
    default_folder_name: String,
    inventory: Arc<dyn InventoryProvider>,
    repository: Box<dyn StateRepository>,
    did_bootstrap: bool,
    /// Set once the state has been reconciled against a scan
    synced: bool,
}

impl LauncherStore {
    pub fn new(inventory: Arc<dyn InventoryProvider>, repository: Box<dyn StateRepository>) -> Self {
        Self {
            state: LauncherState::empty(),
            programs: Vec::new(),
            programs_by_id: HashMap::new(),
            search_query: String::new(),
            last_sync: None,
            last_error: None,
            page_size: DEFAULT_PAGE_SIZE,
            default_folder_name: DEFAULT_FOLDER_NAME.to_string(),
            inventory,
            repository,
            did_bootstrap: false,
            synced: false,
        }
    }

    /// Build a store from configuration, using the configured scanner and repository
    pub fn from_config(config: &LauncherConfig) -> Result<Self> {
        let repository = config.open_repository()?;
        Ok(Self::new(Arc::new(config.scanner()), repository)
            .with_page_size(config.page_size)
            .with_default_folder_name(config.default_folder_name.clone()))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_default_folder_name(mut self, name: String) -> Self {
        self.default_folder_name = name;
        self
    }

    /// Load saved state and scan programs. Runs at most once.
    pub fn bootstrap(&mut self) {
        if self.begin_bootstrap() {
            self.refresh();
        }
    }

    /// Load step of `bootstrap`; returns false if it already ran.
    ///
    /// Callers that scan elsewhere follow this with `apply_scan`.
    pub fn begin_bootstrap(&mut self) -> bool {
        if self.did_bootstrap {
            return false;
        }
        self.did_bootstrap = true;

        match self.repository.load() {
            Ok(Some(state)) => {
                info!(
                    entries = state.ordered_entries.len(),
                    folders = state.folders.len(),
                    "Loaded launcher state"
                );
                self.state = state;
            }
            Ok(None) => debug!("No saved launcher state, starting empty"),
            Err(e) => {
                self.state = LauncherState::empty();
                self.record_error(StoreError::Load(e));
            }
        }
        true
    }

    /// Rescan installed programs and reconcile the layout against them
    pub fn refresh(&mut self) {
        let result = self.inventory.scan();
        self.apply_scan(result);
    }

    /// Apply the outcome of an inventory scan.
    ///
    /// On failure the previous programs and layout are kept.
    pub fn apply_scan(&mut self, result: Result<Vec<Program>>) {
        let programs = match result {
            Ok(programs) => programs,
            Err(e) => {
                self.record_error(StoreError::Scan(e));
                return;
            }
        };

        self.set_programs(programs);
        self.state = reconcile(&self.state, &self.programs);
        self.synced = true;
        self.last_sync = Some(Utc::now());
        if matches!(self.last_error, Some(StoreError::Scan(_))) {
            self.last_error = None;
        }

        info!(
            programs = self.programs.len(),
            entries = self.state.ordered_entries.len(),
            "Inventory refreshed"
        );
        self.touch_and_save();
    }

    fn set_programs(&mut self, programs: Vec<Program>) {
        self.programs_by_id = programs
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        self.programs = programs;
    }

    /// Stamp and persist the current state
    fn touch_and_save(&mut self) {
        self.state.updated_at = Utc::now();

        if self.synced {
            assert_state_invariants(&self.state, |id| self.programs_by_id.contains_key(id));
        }

        match self.repository.save(&self.state) {
            Ok(()) => {
                if matches!(self.last_error, Some(StoreError::Save(_))) {
                    self.last_error = None;
                }
            }
            Err(e) => self.record_error(StoreError::Save(e)),
        }
    }

    fn record_error(&mut self, error: StoreError) {
        warn!(kind = error.kind(), error = %error, "Launcher store error");
        self.last_error = Some(error);
    }

    pub fn state(&self) -> &LauncherState {
        &self.state
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn program(&self, program_id: &str) -> Option<&Program> {
        self.programs_by_id.get(program_id)
    }

    pub fn inventory(&self) -> Arc<dyn InventoryProvider> {
        Arc::clone(&self.inventory)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
