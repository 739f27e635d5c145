//! Real process runner built on `std::process::Command`.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use thiserror::Error;

use crate::logging::RunLogger;

/// Errors from starting or waiting on an external process.
///
/// A tool that starts but exits non-zero is not an error at this layer;
/// the exit code is returned and interpreted by the caller.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The process could not be started (binary missing, not executable).
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the process failed.
    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Spawns an external executable and streams its output.
///
/// Contract: start the process without a shell, forward each non-empty
/// stdout/stderr line to the logger as it arrives, and return the exit
/// code once the process exits. No timeout is enforced at this layer.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` in `workdir` to completion.
    ///
    /// Returns the exit code (`-1` if the process was terminated by a
    /// signal and no code is available).
    fn run(
        &self,
        program: &Path,
        args: &[String],
        workdir: &Path,
        logger: &Arc<RunLogger>,
    ) -> ProcessResult<i32>;
}

/// Production runner using `std::process::Command`.
///
/// Stdout and stderr are drained by two reader threads so neither pipe can
/// fill up and block the child. Lines are serialized into the logger in
/// arrival order per stream.
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for CommandRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        workdir: &Path,
        logger: &Arc<RunLogger>,
    ) -> ProcessResult<i32> {
        let program_name = program.display().to_string();

        let mut child = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        let stdout_reader = child.stdout.take().map(|out| {
            let logger = Arc::clone(logger);
            thread::spawn(move || {
                for line in BufReader::new(out).lines().map_while(Result::ok) {
                    if !line.trim().is_empty() {
                        logger.output_line(&line, false);
                    }
                }
            })
        });

        let stderr_reader = child.stderr.take().map(|err| {
            let logger = Arc::clone(logger);
            thread::spawn(move || {
                for line in BufReader::new(err).lines().map_while(Result::ok) {
                    if !line.trim().is_empty() {
                        logger.output_line(&line, true);
                    }
                }
            })
        });

        let status = child.wait().map_err(|source| ProcessError::Wait {
            program: program_name,
            source,
        })?;

        if let Some(handle) = stdout_reader {
            let _ = handle.join();
        }
        if let Some(handle) = stderr_reader {
            let _ = handle.join();
        }

        Ok(status.code().unwrap_or(-1))
    }
}
