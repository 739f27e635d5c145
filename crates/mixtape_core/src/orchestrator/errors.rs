//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run -> Step -> Operation -> Detail

use std::io;

use thiserror::Error;

use crate::process::ProcessError;
use crate::spec::SpecError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Pipeline was cancelled.
    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// An external tool exited non-zero.
    #[error("{tool} failed with exit code {exit_code} while {operation}")]
    ToolInvocation {
        tool: String,
        exit_code: i32,
        operation: String,
    },

    /// An external tool could not be started or awaited.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A fetched or trimmed file's index has no corresponding spec entry.
    #[error("No start offset for index {index}: spec has only {track_count} tracks")]
    IndexLookup { index: usize, track_count: usize },

    /// Spec parsing failed.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// File I/O error.
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a tool invocation error.
    pub fn tool_invocation(
        tool: impl Into<String>,
        exit_code: i32,
        operation: impl Into<String>,
    ) -> Self {
        Self::ToolInvocation {
            tool: tool.into(),
            exit_code,
            operation: operation.into(),
        }
    }

    /// Create an index lookup error.
    pub fn index_lookup(index: usize, track_count: usize) -> Self {
        Self::IndexLookup { index, track_count }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
