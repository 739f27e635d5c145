//! ParseSpec step - reads the spec file into ordered track specs.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::spec;

/// Parses the spec file and records the track list in the run state.
///
/// Every later stage pairs files with offsets through the indices
/// established here.
pub struct ParseSpecStep;

impl ParseSpecStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParseSpecStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ParseSpecStep {
    fn name(&self) -> &str {
        "ParseSpec"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.base_dir.is_dir() {
            return Err(StepError::invalid_input(format!(
                "Base directory does not exist: {}",
                ctx.base_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        ctx.logger
            .info(&format!("Parsing spec {}", ctx.spec_path.display()));

        let tracks = spec::parse_file(&ctx.spec_path)?;
        ctx.logger.info(&format!("Found {} tracks", tracks.len()));

        state.tracks = tracks;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.tracks.is_empty() {
            return Err(StepError::invalid_output("No tracks recorded"));
        }
        Ok(())
    }
}
