//! Launchpad Core Library
//!
//! Launcher layout models, reconciliation, the launcher store, program
//! inventory, and state persistence.

pub mod config;
pub mod error;
pub mod invariants;
pub mod inventory;
pub mod models;
pub mod reconcile;
pub mod storage;
pub mod store;

pub use config::LauncherConfig;
pub use error::{Error, Result, StoreError};
pub use inventory::{dedupe_programs, DirectoryScanner, InventoryProvider};
pub use models::*;
pub use reconcile::reconcile;
pub use storage::{
    JsonFileRepository, MemoryRepository, SqliteRepository, StateRepository, StorageBackend,
};
pub use store::{LauncherSnapshot, LauncherStore, Mutation};
