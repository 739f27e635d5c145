//! Playlist assembly: randomized ordering and the concat manifest.
//!
//! The listening order is a uniformly random permutation of the trimmed
//! clips, with one randomly chosen stinger (with replacement) after each
//! clip when the stinger pool is non-empty. All randomness flows through
//! a caller-supplied RNG so tests can seed it.

mod manifest;
mod shuffle;

pub use manifest::{build_manifest, manifest_line, write_manifest};
pub use shuffle::shuffled;
