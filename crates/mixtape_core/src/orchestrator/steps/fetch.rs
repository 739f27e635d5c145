//! Fetch step - downloads each source into an indexed local file.
//!
//! Files are written as `songs/<index>.<ext>` so every later stage can
//! recover the spec index from the file name alone. Downloads run one at
//! a time in strictly increasing index order; only the final merge order
//! is randomized.

use std::fs;

use crate::models::{FetchedTrack, IndexFailure};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FetchOutput, RunState, StepOutcome};
use crate::tools::tool_name;

/// Downloads every spec entry with the external fetch tool.
///
/// Exit codes are checked per index. The default is fail-fast at the
/// first failing index; with `continue_on_error` the step records the
/// failure and keeps going, reporting a consolidated summary at the end.
pub struct FetchStep;

impl FetchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FetchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FetchStep {
    fn name(&self) -> &str {
        "Fetch"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.tracks.is_empty() {
            return Err(StepError::invalid_input("No parsed tracks to fetch"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let start = ctx.options.start_index;
        if start >= state.tracks.len() {
            return Ok(StepOutcome::Skipped(format!(
                "Start index {} is past the last track ({})",
                start,
                state.tracks.len() - 1
            )));
        }

        let songs_dir = ctx.songs_dir();
        fs::create_dir_all(&songs_dir)
            .map_err(|e| StepError::io_error("creating songs directory", e))?;

        let ext = &ctx.settings.fetch.audio_format;
        let tool = tool_name(&ctx.tools.fetcher);

        let mut attempted = 0usize;
        let mut fetched = Vec::new();
        let mut failed = Vec::new();

        for track in &state.tracks[start..] {
            if ctx.is_cancelled() {
                ctx.logger
                    .warn(&format!("Cancelled before fetching index {}", track.index));
                break;
            }
            attempted += 1;

            let output = songs_dir.join(format!("{}.{}", track.index, ext));
            ctx.logger.info(&format!("Fetching audio {}", track.source));

            let args = vec![
                "-x".to_string(),
                "--audio-format".to_string(),
                ext.clone(),
                "-o".to_string(),
                output.display().to_string(),
                track.source.clone(),
            ];
            ctx.logger
                .command(&format!("{} {}", ctx.tools.fetcher.display(), args.join(" ")));

            ctx.logger.clear_tail();
            let code = ctx
                .runner
                .run(&ctx.tools.fetcher, &args, &ctx.base_dir, &ctx.logger)?;

            if code != 0 {
                ctx.logger.show_tail(&tool);
                let operation = format!("fetching '{}' (index {})", track.source, track.index);
                if ctx.options.continue_on_error {
                    ctx.logger.warn(&format!(
                        "{} exited with code {} while {}",
                        tool, code, operation
                    ));
                    failed.push(IndexFailure {
                        index: track.index,
                        message: format!("{} exited with code {}", tool, code),
                    });
                } else {
                    return Err(StepError::tool_invocation(tool, code, operation));
                }
            } else {
                fetched.push(FetchedTrack {
                    index: track.index,
                    path: output,
                });
            }

            if ctx.options.only_one {
                ctx.logger.info("Single-item mode: stopping after one fetch");
                break;
            }
        }

        if !failed.is_empty() {
            let indices: Vec<usize> = failed.iter().map(|f| f.index).collect();
            ctx.logger.warn(&format!(
                "Fetch failed for {} of {} tracks: indices {:?}",
                failed.len(),
                attempted,
                indices
            ));
        }

        state.fetch = Some(FetchOutput { fetched, failed });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.fetch.is_none() {
            return Err(StepError::invalid_output("Fetch results not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::steps::testing::{spec_tracks, test_context_with};
    use crate::orchestrator::types::RunOptions;
    use crate::process::{Invocation, RecordingRunner};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn touch_fetch_output(invocation: &Invocation) {
        if let Some(path) = invocation.arg_after("-o") {
            std::fs::write(path, b"audio").unwrap();
        }
    }

    #[test]
    fn fetches_in_strictly_increasing_index_order() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new().with_on_run(touch_fetch_output));
        let ctx = test_context_with(dir.path(), runner.clone(), RunOptions::default());

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b", "http://c"]);

        let outcome = FetchStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 3);
        for (i, invocation) in invocations.iter().enumerate() {
            let out = invocation.arg_after("-o").unwrap();
            assert!(out.ends_with(&format!("{}.mp3", i)), "got {out}");
            assert!(invocation.has_arg("-x"));
        }

        let fetch = state.fetch.unwrap();
        assert_eq!(fetch.fetched.len(), 3);
        assert!(fetch.failed.is_empty());
        assert!(dir.path().join("songs").join("2.mp3").exists());
    }

    #[test]
    fn only_one_stops_after_first_fetch() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new().with_on_run(touch_fetch_output));
        let options = RunOptions {
            only_one: true,
            ..Default::default()
        };
        let ctx = test_context_with(dir.path(), runner.clone(), options);

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b"]);

        FetchStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(runner.invocation_count(), 1);
    }

    #[test]
    fn start_index_skips_earlier_tracks() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new().with_on_run(touch_fetch_output));
        let options = RunOptions {
            start_index: 1,
            ..Default::default()
        };
        let ctx = test_context_with(dir.path(), runner.clone(), options);

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b"]);

        FetchStep::new().execute(&ctx, &mut state).unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0].arg_after("-o").unwrap().ends_with("1.mp3"));
    }

    #[test]
    fn start_index_past_end_is_skipped_outcome() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let options = RunOptions {
            start_index: 5,
            ..Default::default()
        };
        let ctx = test_context_with(dir.path(), runner, options);

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a"]);

        let outcome = FetchStep::new().execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn failed_fetch_aborts_by_default() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new().with_exit_codes([1]));
        let ctx = test_context_with(dir.path(), runner.clone(), RunOptions::default());

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b"]);

        let err = FetchStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::ToolInvocation { exit_code: 1, .. }));
        // Nothing after the failing index was attempted.
        assert_eq!(runner.invocation_count(), 1);
    }

    #[test]
    fn continue_on_error_collects_failed_indices() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(
            RecordingRunner::new()
                .with_on_run(touch_fetch_output)
                .with_exit_codes([1, 0]),
        );
        let options = RunOptions {
            continue_on_error: true,
            ..Default::default()
        };
        let ctx = test_context_with(dir.path(), runner.clone(), options);

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b"]);

        let outcome = FetchStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(runner.invocation_count(), 2);

        let fetch = state.fetch.unwrap();
        assert_eq!(fetch.failed.len(), 1);
        assert_eq!(fetch.failed[0].index, 0);
        assert_eq!(fetch.fetched.len(), 1);
        assert_eq!(fetch.fetched[0].index, 1);
    }

    #[test]
    fn failure_summary_counts_only_attempted_fetches() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new().with_exit_codes([1]));
        let options = RunOptions {
            only_one: true,
            continue_on_error: true,
            ..Default::default()
        };
        let ctx = test_context_with(dir.path(), runner.clone(), options);

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b", "http://c"]);

        FetchStep::new().execute(&ctx, &mut state).unwrap();
        ctx.logger.flush();

        assert_eq!(runner.invocation_count(), 1);
        // The summary denominator is attempts made, not tracks remaining.
        let log = fs::read_to_string(ctx.logger.log_path()).unwrap();
        assert!(log.contains("1 of 1 tracks"), "log was:\n{log}");
    }

    #[test]
    fn cancellation_stops_new_fetches() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let ctx = test_context_with(dir.path(), runner.clone(), RunOptions::default());
        ctx.cancel_handle().cancel();

        let mut state = RunState::new("run");
        state.tracks = spec_tracks(&["http://a", "http://b"]);

        FetchStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(runner.invocation_count(), 0);
    }

    #[test]
    fn empty_track_list_fails_input_validation() {
        let dir = tempdir().unwrap();
        let runner: Arc<RecordingRunner> = Arc::new(RecordingRunner::new());
        let ctx = test_context_with(dir.path(), runner, RunOptions::default());

        let state = RunState::new("run");
        let err = FetchStep::new().validate_input(&ctx, &state).unwrap_err();
        assert!(matches!(err, StepError::InvalidInput(_)));
    }
}
