//! Data models for the launcher

mod display;
mod entry;
mod folder;
mod program;
mod state;

pub use display::*;
pub use entry::*;
pub use folder::*;
pub use program::*;
pub use state::*;
