//! Bookmarks: the ordered shortcut list and its persistence pipeline.
//!
//! This module provides:
//! - The [`Bookmark`] value type and the one-line-per-record file format
//! - [`BookmarkStore`]: backing file locations, legacy fallback, parsing
//! - [`BookmarkList`]: the in-memory list with serialized async load/save
//!   and a file watch for external edits

mod bookmark;
mod list;
mod store;

pub use bookmark::Bookmark;
pub use list::BookmarkList;
pub use store::{BookmarkStore, StoreError, StoreResult};
