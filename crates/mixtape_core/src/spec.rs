//! Spec parsing: raw text into an ordered list of [`TrackSpec`] pairs.
//!
//! The spec format is plain text with values separated by commas and/or
//! newlines, alternating source locator and start offset:
//!
//! ```text
//! http://example.com/a,00:00:10
//! http://example.com/b,00:01:00
//! ```
//!
//! Tokens at even ordinal positions (0-based) are locators, tokens at odd
//! positions are offsets. Empty tokens are discarded, so trailing newlines
//! and Windows line endings are tolerated.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::TrackSpec;

/// Errors produced while parsing a spec.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The backing file does not exist.
    #[error("Spec file not found: {path}")]
    FileNotFound { path: String },

    /// The backing file could not be read.
    #[error("Failed to read spec file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The spec contained no tokens at all.
    #[error("Spec contains no tracks")]
    Empty,

    /// Odd token count: at least one locator has no start offset.
    #[error("Unbalanced spec: {token_count} tokens leave a locator without a start offset")]
    Unbalanced { token_count: usize },
}

/// Result type for spec parsing.
pub type SpecResult<T> = Result<T, SpecError>;

/// Parse raw spec text into ordered track specs.
///
/// Splits on commas and newlines, trims whitespace, and discards empty
/// tokens. Fails if the remaining token count is zero or odd. No locator
/// validation is performed here.
pub fn parse_text(text: &str) -> SpecResult<Vec<TrackSpec>> {
    let tokens: Vec<&str> = text
        .split([',', '\n'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(SpecError::Empty);
    }
    if tokens.len() % 2 != 0 {
        return Err(SpecError::Unbalanced {
            token_count: tokens.len(),
        });
    }

    Ok(tokens
        .chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| TrackSpec {
            index,
            source: pair[0].to_string(),
            start_offset: pair[1].to_string(),
        })
        .collect())
}

/// Parse a spec file from disk.
pub fn parse_file(path: &Path) -> SpecResult<Vec<TrackSpec>> {
    if !path.exists() {
        return Err(SpecError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let text = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_text(&text)
}
