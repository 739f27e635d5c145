//! Pipeline orchestrator.
//!
//! A run is a sequence of [`PipelineStep`]s executed in order against a
//! shared [`Context`] (read-only) and [`RunState`] (accumulating results):
//! ParseSpec reads the track list, Fetch downloads each source, Trim cuts
//! each download to a fixed window, and Assemble shuffles the clips into
//! a manifest and merges them into the final file.

pub mod errors;
pub mod pipeline;
pub mod step;
pub mod steps;
pub mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{AssembleStep, FetchStep, ParseSpecStep, TrimStep};
pub use types::{
    CancelHandle, Context, FetchOutput, MergeOutput, ProgressCallback, RunOptions, RunState,
    StepOutcome, TrimOutput,
};

use std::fs;
use std::path::PathBuf;

/// Build the standard four-step pipeline: parse, fetch, trim, assemble.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ParseSpecStep::new())
        .with_step(FetchStep::new())
        .with_step(TrimStep::new())
        .with_step(AssembleStep::new())
}

/// Write the run state as a JSON summary next to the run log.
///
/// Returns the path written. Failures here are reported but should not
/// fail an otherwise successful run, so callers typically just log them.
pub fn write_run_summary(ctx: &Context, state: &RunState) -> std::io::Result<PathBuf> {
    let logs_dir = ctx.base_dir.join(&ctx.settings.paths.logs_dir);
    fs::create_dir_all(&logs_dir)?;

    let path = logs_dir.join(format!("{}_summary.json", state.run_id));
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(&path, json)?;
    Ok(path)
}
