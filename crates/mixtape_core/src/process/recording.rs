//! Recording process runner for tests.
//!
//! Records every invocation instead of spawning anything, returns queued
//! exit codes, and lets the test fabricate the side effects a real tool
//! would have (e.g. writing the output file) through an `on_run` hook.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::runner::{ProcessResult, ProcessRunner};
use crate::logging::RunLogger;

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub workdir: PathBuf,
}

impl Invocation {
    /// The argument following `flag`, if present.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Whether the argument list contains `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

type OnRunHook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// Test double implementing [`ProcessRunner`].
///
/// Exit codes are popped from a queue in invocation order; when the queue
/// is empty the runner reports success (exit code 0).
#[derive(Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    exit_codes: Mutex<VecDeque<i32>>,
    on_run: Option<OnRunHook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook called for each invocation, typically to create the
    /// files the real tool would have produced.
    pub fn with_on_run(mut self, hook: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        self.on_run = Some(Box::new(hook));
        self
    }

    /// Queue exit codes for upcoming invocations.
    pub fn with_exit_codes(self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.exit_codes.lock().extend(codes);
        self
    }

    /// All invocations recorded so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Number of invocations recorded so far.
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        workdir: &Path,
        _logger: &Arc<RunLogger>,
    ) -> ProcessResult<i32> {
        let invocation = Invocation {
            program: program.to_path_buf(),
            args: args.to_vec(),
            workdir: workdir.to_path_buf(),
        };

        if let Some(ref hook) = self.on_run {
            hook(&invocation);
        }

        self.invocations.lock().push(invocation);
        Ok(self.exit_codes.lock().pop_front().unwrap_or(0))
    }
}
