//! Mixtape Core - pipeline logic for the mixtape generator.
//!
//! This crate contains all business logic with zero UI dependencies.
//! It can be used by the CLI driver or any other front end that can
//! supply a spec file path, a base directory, and an output path, and
//! consume a stream of log lines.

pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod playlist;
pub mod process;
pub mod spec;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
