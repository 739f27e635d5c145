//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{FetchedTrack, IndexFailure, TrackSpec, TrimmedTrack};
use crate::process::ProcessRunner;
use crate::tools::ToolPaths;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Per-run options supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// First spec index to fetch (earlier indices are assumed present).
    pub start_index: usize,
    /// Stop after fetching a single track.
    pub only_one: bool,
    /// Collect per-index fetch/trim failures instead of aborting at the
    /// first one; a consolidated summary is reported at the end of the
    /// stage.
    pub continue_on_error: bool,
    /// Seed for the shuffle/stinger RNG. `None` means entropy-seeded.
    pub shuffle_seed: Option<u64>,
}

/// Read-only context passed to pipeline steps.
///
/// Contains run configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `RunState`.
pub struct Context {
    /// Run name/identifier.
    pub run_name: String,
    /// Path to the spec file.
    pub spec_path: PathBuf,
    /// Base working directory; songs, trimmed clips, the stinger pool and
    /// the manifest all live under it.
    pub base_dir: PathBuf,
    /// Path the final merged file is written to.
    pub output_path: PathBuf,
    /// Application settings.
    pub settings: Settings,
    /// Per-run options.
    pub options: RunOptions,
    /// Resolved external tool paths.
    pub tools: ToolPaths,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// External process runner.
    pub runner: Arc<dyn ProcessRunner>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
    /// Cancellation flag, shared with handles.
    cancelled: Arc<AtomicBool>,
}

impl Context {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_name: impl Into<String>,
        spec_path: PathBuf,
        base_dir: PathBuf,
        output_path: PathBuf,
        settings: Settings,
        options: RunOptions,
        tools: ToolPaths,
        logger: Arc<RunLogger>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            run_name: run_name.into(),
            spec_path,
            base_dir,
            output_path,
            settings,
            options,
            tools,
            logger,
            runner,
            progress_callback: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Get a cancellation handle for this run.
    ///
    /// Cancellation stops the pipeline at the next step boundary and stops
    /// stages from starting new external processes.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Check if the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Directory fetched tracks are written to.
    pub fn songs_dir(&self) -> PathBuf {
        self.base_dir.join(&self.settings.paths.songs_dir)
    }

    /// Directory trimmed clips are written to.
    pub fn trimmed_dir(&self) -> PathBuf {
        self.songs_dir().join(&self.settings.paths.trimmed_dir)
    }

    /// Directory holding the stinger pool.
    pub fn stinger_dir(&self) -> PathBuf {
        self.base_dir.join(&self.settings.paths.stinger_dir)
    }

    /// Path of the concat manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.base_dir.join(&self.settings.paths.manifest_name)
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Cancel the run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Steps add new sections but do not overwrite earlier ones. The state is
/// serialized to a JSON summary at the end of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Parsed track specs (from the ParseSpec step).
    #[serde(default)]
    pub tracks: Vec<TrackSpec>,
    /// Fetch results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchOutput>,
    /// Trim results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimOutput>,
    /// Merge results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeOutput>,
}

impl RunState {
    /// Create a new run state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Look up a start offset by fetched-file index.
    pub fn offset_for(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(|t| t.start_offset.as_str())
    }

    /// All per-index failures collected across stages.
    pub fn failed_indices(&self) -> Vec<&IndexFailure> {
        let mut failures: Vec<&IndexFailure> = Vec::new();
        if let Some(ref fetch) = self.fetch {
            failures.extend(&fetch.failed);
        }
        if let Some(ref trim) = self.trim {
            failures.extend(&trim.failed);
        }
        failures
    }
}

/// Output from the Fetch step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchOutput {
    /// Successfully fetched tracks, in index order.
    pub fetched: Vec<FetchedTrack>,
    /// Per-index failures (continue-on-error mode only).
    #[serde(default)]
    pub failed: Vec<IndexFailure>,
}

/// Output from the Trim step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrimOutput {
    /// Successfully trimmed clips, in index order.
    pub trimmed: Vec<TrimmedTrack>,
    /// Per-index failures (continue-on-error mode only).
    #[serde(default)]
    pub failed: Vec<IndexFailure>,
}

/// Output from the Assemble (merge) step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOutput {
    /// Path to the final merged file.
    pub output_path: PathBuf,
    /// Path of the manifest that was consumed.
    pub manifest_path: PathBuf,
    /// Number of clips in the playlist.
    pub clip_count: usize,
    /// Number of stinger lines appended.
    pub stinger_count: usize,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step had nothing to do (not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_offset_lookup() {
        let mut state = RunState::new("run-1");
        state.tracks = vec![
            TrackSpec {
                index: 0,
                source: "http://a".into(),
                start_offset: "00:00:10".into(),
            },
            TrackSpec {
                index: 1,
                source: "http://b".into(),
                start_offset: "00:01:00".into(),
            },
        ];

        assert_eq!(state.offset_for(1), Some("00:01:00"));
        assert_eq!(state.offset_for(2), None);
    }

    #[test]
    fn run_state_serializes() {
        let state = RunState::new("run-2");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"run_id\":\"run-2\""));
    }

    #[test]
    fn failed_indices_aggregates_stages() {
        let mut state = RunState::new("run-3");
        state.fetch = Some(FetchOutput {
            fetched: vec![],
            failed: vec![IndexFailure {
                index: 0,
                message: "fetch".into(),
            }],
        });
        state.trim = Some(TrimOutput {
            trimmed: vec![],
            failed: vec![IndexFailure {
                index: 2,
                message: "trim".into(),
            }],
        });

        let failed: Vec<usize> = state.failed_indices().iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![0, 2]);
    }
}
