//! Trim step - cuts each fetched file to a fixed-length window.
//!
//! Fetched files are re-discovered from disk rather than threaded through
//! memory: the numeric file stem is parsed back into the spec index and
//! the matching start offset is looked up in the parsed track list. A
//! fetched index with no spec entry is a structured error, never a panic.

use std::fs;
use std::path::PathBuf;

use crate::models::{IndexFailure, TrimmedTrack, CLIP_SECONDS};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome, TrimOutput};
use crate::tools::tool_name;

/// Cuts every fetched file to a [`CLIP_SECONDS`] window starting at its
/// spec offset, writing `songs/trimmed/<index>-cut.<ext>`.
///
/// Transcoder exit codes are always checked; `continue_on_error` collects
/// per-index failures instead of aborting at the first one.
pub struct TrimStep;

impl TrimStep {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate fetched files as (index, path), sorted by index.
    ///
    /// Files whose stem is not a number are skipped with a warning so a
    /// stray file in the songs directory cannot abort the run.
    fn discover_fetched(&self, ctx: &Context) -> StepResult<Vec<(usize, PathBuf)>> {
        let songs_dir = ctx.songs_dir();
        let entries = fs::read_dir(&songs_dir)
            .map_err(|e| StepError::io_error("reading songs directory", e))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StepError::io_error("reading songs directory", e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            match stem.parse::<usize>() {
                Ok(index) => found.push((index, path)),
                Err(_) => {
                    ctx.logger.warn(&format!(
                        "Skipping non-indexed file in songs directory: {}",
                        path.display()
                    ));
                }
            }
        }

        found.sort_by_key(|(index, _)| *index);
        Ok(found)
    }
}

impl Default for TrimStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TrimStep {
    fn name(&self) -> &str {
        "Trim"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.tracks.is_empty() {
            return Err(StepError::invalid_input("No parsed tracks for offset lookup"));
        }
        if !ctx.songs_dir().is_dir() {
            return Err(StepError::invalid_input(format!(
                "Songs directory does not exist: {}",
                ctx.songs_dir().display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let fetched = self.discover_fetched(ctx)?;
        if fetched.is_empty() {
            return Ok(StepOutcome::Skipped("No fetched files to trim".to_string()));
        }

        let trimmed_dir = ctx.trimmed_dir();
        fs::create_dir_all(&trimmed_dir)
            .map_err(|e| StepError::io_error("creating trimmed directory", e))?;

        let tool = tool_name(&ctx.tools.transcoder);
        let track_count = state.tracks.len();

        let mut trimmed = Vec::new();
        let mut failed = Vec::new();

        for (index, input) in fetched {
            if ctx.is_cancelled() {
                ctx.logger
                    .warn(&format!("Cancelled before trimming index {}", index));
                break;
            }

            let offset = match state.offset_for(index) {
                Some(offset) => offset.to_string(),
                None => {
                    let err = StepError::index_lookup(index, track_count);
                    if ctx.options.continue_on_error {
                        ctx.logger.warn(&err.to_string());
                        failed.push(IndexFailure {
                            index,
                            message: err.to_string(),
                        });
                        continue;
                    }
                    return Err(err);
                }
            };

            let ext = input
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_else(|| ctx.settings.fetch.audio_format.clone());
            let output = trimmed_dir.join(format!("{}-cut.{}", index, ext));

            ctx.logger.info(&format!(
                "Cutting audio {} at {} for {}s",
                input.display(),
                offset,
                CLIP_SECONDS
            ));

            let args = vec![
                "-ss".to_string(),
                offset,
                "-t".to_string(),
                CLIP_SECONDS.to_string(),
                "-i".to_string(),
                input.display().to_string(),
                output.display().to_string(),
                "-y".to_string(),
            ];
            ctx.logger.command(&format!(
                "{} {}",
                ctx.tools.transcoder.display(),
                args.join(" ")
            ));

            ctx.logger.clear_tail();
            let code = ctx
                .runner
                .run(&ctx.tools.transcoder, &args, &ctx.base_dir, &ctx.logger)?;

            if code != 0 {
                ctx.logger.show_tail(&tool);
                let operation = format!("trimming index {}", index);
                if ctx.options.continue_on_error {
                    ctx.logger.warn(&format!(
                        "{} exited with code {} while {}",
                        tool, code, operation
                    ));
                    failed.push(IndexFailure {
                        index,
                        message: format!("{} exited with code {}", tool, code),
                    });
                } else {
                    return Err(StepError::tool_invocation(tool, code, operation));
                }
            } else {
                trimmed.push(TrimmedTrack {
                    index,
                    path: output,
                });
            }
        }

        if !failed.is_empty() {
            let indices: Vec<usize> = failed.iter().map(|f| f.index).collect();
            ctx.logger.warn(&format!(
                "Trim failed for {} files: indices {:?}",
                failed.len(),
                indices
            ));
        }

        state.trim = Some(TrimOutput { trimmed, failed });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.trim.is_none() {
            return Err(StepError::invalid_output("Trim results not recorded"));
        }
        Ok(())
    }
}
