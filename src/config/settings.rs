//! Settings struct with TOML-based sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Bookmark file locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// File-watch behavior for the bookmarks file.
    #[serde(default)]
    pub watch: WatchSettings,
}

/// Overrides for the bookmark file locations.
///
/// When unset, the standard locations are used: the per-user config dir
/// (`gtk-3.0/bookmarks`) and the legacy `~/.gtk-bookmarks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Primary bookmarks file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks_file: Option<PathBuf>,

    /// Legacy bookmarks file, consulted only when the primary is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_bookmarks_file: Option<PathBuf>,
}

/// File-watch configuration for picking up external bookmark edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Watch the bookmarks file for external changes.
    #[serde(default = "default_watch_enabled")]
    pub enabled: bool,

    /// Coalescing window for watch events, in milliseconds. Events arriving
    /// within this window after a reload collapse into that reload.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_watch_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            enabled: default_watch_enabled(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl WatchSettings {
    /// Settings with watching turned off (headless use, tests).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
