//! Configuration management for the mixtape pipeline.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Defaults for every field, so partial configs load cleanly
//!
//! # Example
//!
//! ```no_run
//! use mixtape_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("mixtape.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Songs dir: {}", config.settings().paths.songs_dir);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{FetchSettings, LoggingSettings, PathSettings, Settings, ToolSettings};
