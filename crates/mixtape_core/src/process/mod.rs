//! External process execution with streamed output.
//!
//! Every stage of the pipeline shells out to an external tool (the fetcher
//! or the transcoder) through the [`ProcessRunner`] trait. The real
//! implementation is [`CommandRunner`]; tests substitute
//! [`RecordingRunner`] to observe invocations and fabricate results.
//!
//! The runner never interprets tool-specific output. It forwards output
//! lines to the run logger and returns the exit code; callers decide what
//! a non-zero exit means.

mod recording;
mod runner;

pub use recording::{Invocation, RecordingRunner};
pub use runner::{CommandRunner, ProcessError, ProcessRunner};
