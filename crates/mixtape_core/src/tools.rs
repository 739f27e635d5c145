//! Resolution of external tool binaries (fetcher and transcoder).
//!
//! The pipeline itself only ever sees resolved paths in [`ToolPaths`];
//! platform-specific lookup lives behind the [`ToolLocator`] trait so a
//! host can substitute its own resolution strategy.

use std::path::{Path, PathBuf};

use crate::config::ToolSettings;

/// Resolved absolute (or PATH-resolvable) paths for the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Media downloader (yt-dlp or compatible).
    pub fetcher: PathBuf,
    /// Transcoder/concatenator (ffmpeg or compatible).
    pub transcoder: PathBuf,
}

/// Locates the external tool binaries for a given base directory.
pub trait ToolLocator: Send + Sync {
    fn locate(&self, base_dir: &Path) -> ToolPaths;
}

/// Default locator.
///
/// Resolution order per tool:
/// 1. explicit path from `ToolSettings` (non-empty),
/// 2. platform-specific binary name inside `<base_dir>/<tools_dir>/`,
/// 3. bare command name, resolved through PATH at spawn time.
///
/// A binary that cannot be found at all surfaces later as a spawn error
/// from the process runner, with the attempted path in the message.
pub struct SystemToolLocator {
    settings: ToolSettings,
    tools_dir: String,
}

impl SystemToolLocator {
    pub fn new(settings: ToolSettings, tools_dir: impl Into<String>) -> Self {
        Self {
            settings,
            tools_dir: tools_dir.into(),
        }
    }

    fn resolve(&self, base_dir: &Path, explicit: &str, platform_name: &str, bare: &str) -> PathBuf {
        if !explicit.is_empty() {
            return PathBuf::from(explicit);
        }

        let bundled = base_dir.join(&self.tools_dir).join(platform_name);
        if bundled.exists() {
            return bundled;
        }

        PathBuf::from(bare)
    }
}

impl ToolLocator for SystemToolLocator {
    fn locate(&self, base_dir: &Path) -> ToolPaths {
        ToolPaths {
            fetcher: self.resolve(
                base_dir,
                &self.settings.fetcher,
                platform_fetcher_name(),
                "yt-dlp",
            ),
            transcoder: self.resolve(
                base_dir,
                &self.settings.transcoder,
                platform_transcoder_name(),
                "ffmpeg",
            ),
        }
    }
}

/// Platform-specific fetcher binary name inside the bundled tools dir.
fn platform_fetcher_name() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else {
        "yt-dlp"
    }
}

/// Platform-specific transcoder binary name inside the bundled tools dir.
fn platform_transcoder_name() -> &'static str {
    if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

/// Short tool name for log and error messages (file stem of the binary).
pub fn tool_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_setting_wins() {
        let settings = ToolSettings {
            fetcher: "/opt/bin/yt-dlp".to_string(),
            transcoder: String::new(),
        };
        let locator = SystemToolLocator::new(settings, "tools");
        let paths = locator.locate(Path::new("/base"));
        assert_eq!(paths.fetcher, PathBuf::from("/opt/bin/yt-dlp"));
    }

    #[test]
    fn bundled_binary_is_preferred_over_bare_name() {
        let dir = tempdir().unwrap();
        let tools = dir.path().join("tools");
        std::fs::create_dir_all(&tools).unwrap();
        std::fs::write(tools.join(platform_transcoder_name()), b"").unwrap();

        let locator = SystemToolLocator::new(ToolSettings::default(), "tools");
        let paths = locator.locate(dir.path());
        assert_eq!(paths.transcoder, tools.join(platform_transcoder_name()));
    }

    #[test]
    fn falls_back_to_bare_command_name() {
        let dir = tempdir().unwrap();
        let locator = SystemToolLocator::new(ToolSettings::default(), "tools");
        let paths = locator.locate(dir.path());
        assert_eq!(paths.fetcher, PathBuf::from("yt-dlp"));
    }

    #[test]
    fn tool_name_strips_path_and_extension() {
        assert_eq!(tool_name(Path::new("/opt/tools/ffmpeg.exe")), "ffmpeg");
        assert_eq!(tool_name(Path::new("yt-dlp")), "yt-dlp");
    }
}
