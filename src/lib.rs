//! fm_core - backend logic for the file manager shell.
//!
//! This crate contains the non-UI core: the background file-operation job
//! queue and the persistent bookmark list. Windows, panes, menus and the
//! desktop canvas live elsewhere and talk to this crate by submitting jobs
//! and subscribing to change notifications.

pub mod bookmarks;
pub mod config;
pub mod events;
pub mod jobs;
pub mod logging;
pub mod tasks;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
