//! Backing file access for the bookmark list.
//!
//! The store knows the two candidate locations (primary and the legacy
//! `~/.gtk-bookmarks`), reads whichever applies, and writes the primary,
//! creating parent directories as needed. Parsing and rendering of whole
//! files lives here as well.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::PathSettings;

use super::bookmark::Bookmark;

/// Errors from bookmark file I/O.
///
/// A missing file is an expected condition (fresh profile) and is kept
/// distinct from real I/O failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bookmarks file not found")]
    NotFound,

    #[error("bookmarks file I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Locations of the bookmarks file.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    primary: PathBuf,
    legacy: PathBuf,
}

impl BookmarkStore {
    pub fn new(primary: impl Into<PathBuf>, legacy: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            legacy: legacy.into(),
        }
    }

    /// Standard per-user locations: `<config dir>/gtk-3.0/bookmarks` with
    /// `~/.gtk-bookmarks` as the legacy fallback.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn default_paths() -> Option<Self> {
        let base = directories::BaseDirs::new()?;
        Some(Self {
            primary: base.config_dir().join("gtk-3.0").join("bookmarks"),
            legacy: base.home_dir().join(".gtk-bookmarks"),
        })
    }

    /// Locations from settings, falling back to the standard ones for any
    /// path not overridden.
    pub fn from_settings(paths: &PathSettings) -> Option<Self> {
        match (&paths.bookmarks_file, &paths.legacy_bookmarks_file) {
            (Some(primary), Some(legacy)) => Some(Self::new(primary.clone(), legacy.clone())),
            (primary, legacy) => {
                let defaults = Self::default_paths()?;
                Some(Self {
                    primary: primary.clone().unwrap_or(defaults.primary),
                    legacy: legacy.clone().unwrap_or(defaults.legacy),
                })
            }
        }
    }

    /// The file saves target and the watch observes.
    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn legacy_path(&self) -> &Path {
        &self.legacy
    }

    /// Read the bookmarks file as text.
    ///
    /// The legacy path is consulted only when the primary does not exist.
    pub fn read(&self) -> StoreResult<String> {
        let path = if self.primary.exists() {
            &self.primary
        } else {
            &self.legacy
        };

        fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::Io(e)
            }
        })
    }

    /// Replace the primary file's contents, creating parent directories.
    pub fn write(&self, contents: &str) -> StoreResult<()> {
        if let Some(parent) = self.primary.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.primary, contents)?;
        Ok(())
    }

    /// Parse file contents into bookmarks, skipping malformed lines.
    pub fn parse(contents: &str) -> Vec<Bookmark> {
        contents.lines().filter_map(Bookmark::parse_line).collect()
    }

    /// Render bookmarks as file contents, one line each.
    pub fn render(bookmarks: &[Bookmark]) -> String {
        let mut out = String::new();
        for bookmark in bookmarks {
            out.push_str(&bookmark.to_line());
            out.push('\n');
        }
        out
    }
}
