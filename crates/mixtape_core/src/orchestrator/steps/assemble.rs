//! Assemble step - randomized playlist, concat manifest, final merge.
//!
//! The listening order is the feature: trimmed clips are shuffled into a
//! uniformly random permutation, one stinger (chosen with replacement)
//! follows each clip when the pool is non-empty, and the transcoder
//! concatenates the manifest losslessly into the final output file.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{StingerClip, TrimmedTrack};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, MergeOutput, RunState, StepOutcome};
use crate::playlist;
use crate::tools::tool_name;

pub struct AssembleStep;

impl AssembleStep {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate trimmed clips as absolute paths, sorted by index.
    ///
    /// The index is recovered from the `<index>-cut` file stem; anything
    /// else in the directory is ignored with a warning.
    fn discover_trimmed(&self, ctx: &Context) -> StepResult<Vec<TrimmedTrack>> {
        let trimmed_dir = ctx.trimmed_dir();
        if !trimmed_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&trimmed_dir)
            .map_err(|e| StepError::io_error("reading trimmed directory", e))?;

        let mut clips = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StepError::io_error("reading trimmed directory", e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let index = stem.strip_suffix("-cut").and_then(|s| s.parse::<usize>().ok());
            match index {
                Some(index) => clips.push(TrimmedTrack {
                    index,
                    path: absolute(&path)?,
                }),
                None => {
                    ctx.logger.warn(&format!(
                        "Skipping unrecognized file in trimmed directory: {}",
                        path.display()
                    ));
                }
            }
        }

        clips.sort_by_key(|c| c.index);
        Ok(clips)
    }

    /// Enumerate the stinger pool. An absent or empty directory is an
    /// empty pool, not an error.
    fn discover_stingers(&self, ctx: &Context) -> StepResult<Vec<StingerClip>> {
        let stinger_dir = ctx.stinger_dir();
        if !stinger_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&stinger_dir)
            .map_err(|e| StepError::io_error("reading stinger directory", e))?;

        let mut stingers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StepError::io_error("reading stinger directory", e))?;
            let path = entry.path();
            if path.is_file() {
                stingers.push(StingerClip {
                    path: absolute(&path)?,
                });
            }
        }

        stingers.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(stingers)
    }
}

/// Canonicalize a path so manifest references are absolute.
fn absolute(path: &Path) -> StepResult<PathBuf> {
    fs::canonicalize(path)
        .map_err(|e| StepError::io_error(format!("resolving path {}", path.display()), e))
}

impl Default for AssembleStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleStep {
    fn name(&self) -> &str {
        "Assemble"
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
        let clips = self.discover_trimmed(ctx)?;
        if clips.is_empty() {
            return Ok(StepOutcome::Skipped("No trimmed clips to merge".to_string()));
        }

        let mut rng = match ctx.options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let clips = playlist::shuffled(clips, &mut rng);
        let stingers = self.discover_stingers(ctx)?;

        ctx.logger.info(&format!(
            "Assembling playlist: {} clips, {} stingers in pool",
            clips.len(),
            stingers.len()
        ));

        let lines = playlist::build_manifest(&clips, &stingers, &mut rng);
        let stinger_count = lines.len() - clips.len();

        let manifest_path = ctx.manifest_path();
        playlist::write_manifest(&manifest_path, &lines)
            .map_err(|e| StepError::io_error("writing manifest", e))?;
        ctx.logger.info(&format!(
            "Wrote manifest with {} entries to {}",
            lines.len(),
            manifest_path.display()
        ));

        if let Some(parent) = ctx.output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StepError::io_error("creating output directory", e))?;
        }

        let tool = tool_name(&ctx.tools.transcoder);
        ctx.logger
            .info(&format!("Merging audio to {}", ctx.output_path.display()));

        let args = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            manifest_path.display().to_string(),
            "-codec".to_string(),
            ctx.settings.fetch.audio_format.clone(),
            ctx.output_path.display().to_string(),
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
            return Err(StepError::tool_invocation(
                tool,
                code,
                format!("concatenating {} manifest entries", lines.len()),
            ));
        }

        state.merge = Some(MergeOutput {
            output_path: ctx.output_path.clone(),
            manifest_path,
            clip_count: clips.len(),
            stinger_count,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.merge.is_none() {
            return Err(StepError::invalid_output("Merge results not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::steps::testing::test_context_with;
    use crate::orchestrator::types::RunOptions;
    use crate::process::RecordingRunner;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write_trimmed(dir: &Path, count: usize) {
        let trimmed = dir.join("songs").join("trimmed");
        fs::create_dir_all(&trimmed).unwrap();
        for i in 0..count {
            fs::write(trimmed.join(format!("{i}-cut.mp3")), b"clip").unwrap();
        }
    }

    fn write_stingers(dir: &Path, names: &[&str]) {
        let cheers = dir.join("cheers");
        fs::create_dir_all(&cheers).unwrap();
        for name in names {
            fs::write(cheers.join(name), b"stinger").unwrap();
        }
    }

    fn seeded_options() -> RunOptions {
        RunOptions {
            shuffle_seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn writes_manifest_and_invokes_concat() {
        let dir = tempdir().unwrap();
        write_trimmed(dir.path(), 2);

        let runner = Arc::new(RecordingRunner::new());
        let ctx = test_context_with(dir.path(), runner.clone(), seeded_options());

        let mut state = RunState::new("run");
        let outcome = AssembleStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);

        let manifest = fs::read_to_string(dir.path().join("songlist.txt")).unwrap();
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("file '")));
        assert!(lines.iter().any(|l| l.contains("0-cut.mp3")));
        assert!(lines.iter().any(|l| l.contains("1-cut.mp3")));

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0].has_arg("concat"));
        assert!(invocations[0].has_arg("-y"));
        assert_eq!(
            invocations[0].arg_after("-i").unwrap(),
            dir.path().join("songlist.txt").display().to_string()
        );

        let merge = state.merge.unwrap();
        assert_eq!(merge.clip_count, 2);
        assert_eq!(merge.stinger_count, 0);
    }

    #[test]
    fn stinger_follows_every_clip_when_pool_nonempty() {
        let dir = tempdir().unwrap();
        write_trimmed(dir.path(), 3);
        write_stingers(dir.path(), &["airhorn.mp3", "cheer.mp3"]);

        let runner = Arc::new(RecordingRunner::new());
        let ctx = test_context_with(dir.path(), runner, seeded_options());

        let mut state = RunState::new("run");
        AssembleStep::new().execute(&ctx, &mut state).unwrap();

        let manifest = fs::read_to_string(dir.path().join("songlist.txt")).unwrap();
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 6);
        for pair in lines.chunks_exact(2) {
            assert!(pair[0].contains("-cut.mp3"));
            assert!(pair[1].contains("cheers"));
        }

        assert_eq!(state.merge.unwrap().stinger_count, 3);
    }

    #[test]
    fn empty_clip_set_is_skipped_not_error() {
        let dir = tempdir().unwrap();

        let runner = Arc::new(RecordingRunner::new());
        let ctx = test_context_with(dir.path(), runner.clone(), seeded_options());

        let mut state = RunState::new("run");
        let outcome = AssembleStep::new().execute(&ctx, &mut state).unwrap();

        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert_eq!(runner.invocation_count(), 0);
    }

    #[test]
    fn same_seed_gives_same_playlist() {
        let dir = tempdir().unwrap();
        write_trimmed(dir.path(), 5);

        let first = {
            let runner = Arc::new(RecordingRunner::new());
            let ctx = test_context_with(dir.path(), runner, seeded_options());
            let mut state = RunState::new("run");
            AssembleStep::new().execute(&ctx, &mut state).unwrap();
            fs::read_to_string(dir.path().join("songlist.txt")).unwrap()
        };

        let second = {
            let runner = Arc::new(RecordingRunner::new());
            let ctx = test_context_with(dir.path(), runner, seeded_options());
            let mut state = RunState::new("run");
            AssembleStep::new().execute(&ctx, &mut state).unwrap();
            fs::read_to_string(dir.path().join("songlist.txt")).unwrap()
        };

        assert_eq!(first, second);
    }

    #[test]
    fn failing_merge_is_tool_invocation_error() {
        let dir = tempdir().unwrap();
        write_trimmed(dir.path(), 1);

        let runner = Arc::new(RecordingRunner::new().with_exit_codes([1]));
        let ctx = test_context_with(dir.path(), runner, seeded_options());

        let mut state = RunState::new("run");
        let err = AssembleStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::ToolInvocation { exit_code: 1, .. }));
    }
}
