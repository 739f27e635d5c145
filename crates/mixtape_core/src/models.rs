//! Data model for one mixtape run.
//!
//! The `index` of a track is its ordinal position in the parsed spec and
//! is the pairing key used by every later stage. Fetched and trimmed
//! files carry the index in their file name, so each stage can re-discover
//! its inputs from disk without a side table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fixed length of every trimmed clip, in seconds.
pub const CLIP_SECONDS: u32 = 59;

/// One entry of the parsed spec: a source locator paired with the
/// offset at which its 59-second window starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    /// Ordinal position in the spec.
    pub index: usize,
    /// Source locator (typically a URL). Not validated at parse time;
    /// malformed locators surface when the fetch tool fails.
    pub source: String,
    /// Start offset passed verbatim to the transcoder (e.g. `00:01:30`).
    pub start_offset: String,
}

/// A track downloaded into `songs/<index>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedTrack {
    pub index: usize,
    pub path: PathBuf,
}

/// A fixed-duration clip at `songs/trimmed/<index>-cut.<ext>`.
///
/// The assembler only reads trimmed files; it never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimmedTrack {
    pub index: usize,
    pub path: PathBuf,
}

/// A short clip from the stinger pool, interleaved between tracks in the
/// final output. The pool may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StingerClip {
    pub path: PathBuf,
}

/// A per-index failure recorded by a stage running in continue-on-error
/// mode, reported as a consolidated summary at the end of the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFailure {
    pub index: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_spec_serializes() {
        let track = TrackSpec {
            index: 3,
            source: "http://example.com/a".to_string(),
            start_offset: "00:00:10".to_string(),
        };
        let json = serde_json::to_string(&track).unwrap();
        assert!(json.contains("\"index\":3"));
        assert!(json.contains("00:00:10"));
    }
}
