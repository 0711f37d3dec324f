//! Configuration for the file manager core.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use fm_core::config::ConfigManager;
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/fm/settings.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Watch enabled: {}", config.settings().watch.enabled);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{PathSettings, Settings, WatchSettings};
