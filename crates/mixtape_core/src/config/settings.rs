//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a serde default so partial config files load cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Directory and file naming.
    #[serde(default)]
    pub paths: PathSettings,

    /// Fetch stage behavior.
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Explicit external tool paths (empty = auto-detect).
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Directory and file names, all relative to the run's base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory fetched tracks are written to.
    #[serde(default = "default_songs_dir")]
    pub songs_dir: String,

    /// Subdirectory of the songs dir for trimmed clips.
    #[serde(default = "default_trimmed_dir")]
    pub trimmed_dir: String,

    /// Directory holding the stinger pool. May be absent or empty.
    #[serde(default = "default_stinger_dir")]
    pub stinger_dir: String,

    /// Directory bundled tool binaries are looked up in.
    #[serde(default = "default_tools_dir")]
    pub tools_dir: String,

    /// Directory run log files are written to.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// Name of the concat manifest file, overwritten each run.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

fn default_songs_dir() -> String {
    "songs".to_string()
}

fn default_trimmed_dir() -> String {
    "trimmed".to_string()
}

fn default_stinger_dir() -> String {
    "cheers".to_string()
}

fn default_tools_dir() -> String {
    "tools".to_string()
}

fn default_logs_dir() -> String {
    ".logs".to_string()
}

fn default_manifest_name() -> String {
    "songlist.txt".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            songs_dir: default_songs_dir(),
            trimmed_dir: default_trimmed_dir(),
            stinger_dir: default_stinger_dir(),
            tools_dir: default_tools_dir(),
            logs_dir: default_logs_dir(),
            manifest_name: default_manifest_name(),
        }
    }
}

/// Fetch stage behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Audio format requested from the fetch tool and used for all
    /// intermediate file extensions.
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            audio_format: default_audio_format(),
        }
    }
}

/// Explicit tool binary paths. Empty strings mean auto-detection
/// (bundled tools dir, then PATH).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default)]
    pub fetcher: String,

    #[serde(default)]
    pub transcoder: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Compact mode: raw tool output is buffered and shown only on failure.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines retained for the error tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: default_true(),
            error_tail: default_error_tail(),
            show_timestamps: default_true(),
        }
    }
}

impl LoggingSettings {
    /// Convert to a run logger configuration.
    pub fn to_log_config(&self) -> crate::logging::LogConfig {
        crate::logging::LogConfig {
            level: crate::logging::LogLevel::Info,
            compact: self.compact,
            error_tail: self.error_tail,
            show_timestamps: self.show_timestamps,
        }
    }
}
