//! Command-line driver for the mixtape generator.
//!
//! Wires the core pipeline to the terminal: loads (or creates) the TOML
//! config, resolves the external tools, runs the four pipeline stages and
//! prints the run log as it is produced.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;

use mixtape_core::config::ConfigManager;
use mixtape_core::logging::{init_tracing, LogCallback, LogConfig, LogLevel, RunLogger};
use mixtape_core::orchestrator::{
    create_standard_pipeline, write_run_summary, Context, RunOptions, RunState,
};
use mixtape_core::process::CommandRunner;
use mixtape_core::tools::{SystemToolLocator, ToolLocator};

#[derive(Parser, Debug)]
#[command(name = "mixtape", version, about = "Fetch, trim and merge a spec of songs into one mixtape")]
struct Cli {
    /// Spec file: one `URL,HH:MM:SS` pair per line (commas and newlines
    /// both separate values).
    spec: PathBuf,

    /// Working directory; songs, trimmed clips, the stinger pool and the
    /// manifest all live under it.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Output file. Defaults to `mixtape_<timestamp>.mp3` in the base
    /// directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// First spec index to fetch; earlier indices are assumed already
    /// downloaded.
    #[arg(long, default_value_t = 0)]
    start_index: usize,

    /// Stop after fetching a single track.
    #[arg(long)]
    only_one: bool,

    /// Keep going past failed downloads or trims and merge whatever
    /// survived.
    #[arg(long)]
    continue_on_error: bool,

    /// Shuffle seed, for a reproducible playlist order.
    #[arg(long)]
    seed: Option<u64>,

    /// Config file. Defaults to `mixtape.toml` in the base directory,
    /// created with defaults if absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    let base_dir = cli.base_dir.clone();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| base_dir.join("mixtape.toml"));

    let mut config = ConfigManager::new(&config_path);
    config
        .load_or_create()
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let settings = config.settings().clone();

    let run_name = format!(
        "mixtape_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| base_dir.join(format!("{}.mp3", run_name)));

    let logs_dir = base_dir.join(&settings.paths.logs_dir);
    let callback: LogCallback = Box::new(|line| println!("{}", line));
    // Verbose runs echo raw tool output instead of buffering it.
    let log_config = if cli.verbose {
        LogConfig::debug()
    } else {
        settings.logging.to_log_config()
    };
    let logger = Arc::new(
        RunLogger::new(&run_name, &logs_dir, log_config, Some(callback))
        .with_context(|| format!("creating run log in {}", logs_dir.display()))?,
    );

    let locator = SystemToolLocator::new(settings.tools.clone(), settings.paths.tools_dir.clone());
    let tools = locator.locate(&base_dir);
    tracing::debug!(
        fetcher = %tools.fetcher.display(),
        transcoder = %tools.transcoder.display(),
        "resolved external tools"
    );

    let options = RunOptions {
        start_index: cli.start_index,
        only_one: cli.only_one,
        continue_on_error: cli.continue_on_error,
        shuffle_seed: cli.seed,
    };

    let ctx = Context::new(
        run_name.clone(),
        cli.spec.clone(),
        base_dir,
        output_path,
        settings,
        options,
        tools,
        Arc::clone(&logger),
        Arc::new(CommandRunner::new()),
    );

    let mut state = RunState::new(&run_name);
    let result = create_standard_pipeline().run(&ctx, &mut state);

    // The summary is best-effort; a failed write never masks the run result.
    match write_run_summary(&ctx, &state) {
        Ok(path) => tracing::debug!(summary = %path.display(), "run summary written"),
        Err(e) => logger.warn(&format!("Could not write run summary: {}", e)),
    }

    let run_result = result.with_context(|| format!("run '{}' failed", run_name))?;

    if let Some(merge) = &state.merge {
        println!(
            "Wrote {} ({} clips, {} stingers)",
            merge.output_path.display(),
            merge.clip_count,
            merge.stinger_count
        );
    } else if !run_result.steps_skipped.is_empty() {
        println!(
            "Nothing merged; skipped steps: {}",
            run_result.steps_skipped.join(", ")
        );
    }

    let failed = state.failed_indices();
    if !failed.is_empty() {
        println!("{} spec entries failed:", failed.len());
        for failure in failed {
            println!("  index {}: {}", failure.index, failure.message);
        }
    }

    Ok(())
}
