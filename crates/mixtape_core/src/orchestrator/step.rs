//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, RunState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Should check that all required preconditions are met (files exist,
    /// previous steps recorded their output, etc.).
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Performs the step's processing and records results in `state`.
    /// Use `ctx.logger` for logging and `ctx.is_cancelled()` between
    /// long-running entries.
    ///
    /// Returns `StepOutcome::Success` on completion, or
    /// `StepOutcome::Skipped` if the step determined there was nothing to
    /// do (not an error).
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called only when `execute` returned `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::errors::StepError;

    struct MockStep {
        name: &'static str,
        should_skip: bool,
    }

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut RunState) -> StepResult<StepOutcome> {
            if self.should_skip {
                Ok(StepOutcome::Skipped("Nothing to do".to_string()))
            } else {
                Ok(StepOutcome::Success)
            }
        }

        fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Err(StepError::invalid_output("always fails"))
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep {
            name: "TestStep",
            should_skip: false,
        });

        assert_eq!(step.name(), "TestStep");
    }
}
