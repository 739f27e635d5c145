//! Concat manifest generation.
//!
//! The manifest is the concat demuxer's input list: one
//! `file '<absolute path>'` line per clip, with any literal single quote
//! in the path escaped by doubling it. It lives at a fixed path in the
//! work dir and is overwritten on every run.

use std::fs;
use std::io;
use std::path::Path;

use rand::Rng;

use crate::models::{StingerClip, TrimmedTrack};

/// Format one manifest line for the concat demuxer.
///
/// Single quotes in the path are doubled, which is the demuxer's escape
/// for a literal quote inside a quoted string.
pub fn manifest_line(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', "''");
    format!("file '{}'", escaped)
}

/// Build manifest lines for clips already in playback order.
///
/// After each clip line, if the stinger pool is non-empty, one stinger is
/// chosen uniformly at random (with replacement) and appended. An empty
/// pool produces no stinger lines at all.
pub fn build_manifest<R: Rng>(
    clips: &[TrimmedTrack],
    stingers: &[StingerClip],
    rng: &mut R,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(clips.len() * 2);

    for clip in clips {
        lines.push(manifest_line(&clip.path));
        if !stingers.is_empty() {
            let stinger = &stingers[rng.gen_range(0..stingers.len())];
            lines.push(manifest_line(&stinger.path));
        }
    }

    lines
}

/// Write manifest lines to `path`, overwriting any previous manifest.
pub fn write_manifest(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn clip(index: usize) -> TrimmedTrack {
        TrimmedTrack {
            index,
            path: PathBuf::from(format!("/work/songs/trimmed/{index}-cut.mp3")),
        }
    }

    fn stinger(name: &str) -> StingerClip {
        StingerClip {
            path: PathBuf::from(format!("/work/cheers/{name}.mp3")),
        }
    }

    #[test]
    fn quotes_are_doubled() {
        let line = manifest_line(Path::new("/work/rock'n'roll.mp3"));
        assert_eq!(line, "file '/work/rock''n''roll.mp3'");
    }

    #[test]
    fn empty_pool_yields_clip_lines_only() {
        let clips = vec![clip(0), clip(1), clip(2)];
        let mut rng = StdRng::seed_from_u64(1);

        let lines = build_manifest(&clips, &[], &mut rng);

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.contains("-cut.mp3")));
    }

    #[test]
    fn one_stinger_line_follows_every_clip_line() {
        let clips = vec![clip(0), clip(1), clip(2)];
        let stingers = vec![stinger("airhorn"), stinger("cheer")];
        let mut rng = StdRng::seed_from_u64(1);

        let lines = build_manifest(&clips, &stingers, &mut rng);

        assert_eq!(lines.len(), 6);
        for pair in lines.chunks_exact(2) {
            assert!(pair[0].contains("-cut.mp3"), "clip line first: {}", pair[0]);
            assert!(pair[1].contains("/cheers/"), "stinger second: {}", pair[1]);
        }
    }

    #[test]
    fn writes_one_line_per_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songlist.txt");
        let lines = vec![
            manifest_line(Path::new("/a.mp3")),
            manifest_line(Path::new("/b.mp3")),
        ];

        write_manifest(&path, &lines).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "file '/a.mp3'\nfile '/b.mp3'\n");
    }
}
