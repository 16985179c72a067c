//! Fixed-interval frame sampling.
//!
//! Writes every Nth decoded frame of a source video to disk as a JPEG, where
//! N is derived from the source frame rate divided by the target analysis
//! rate. Frame order downstream is derived from the sequential index embedded
//! in each filename, never from directory enumeration order.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

const FRAME_PREFIX: &str = "frame_";
const FRAME_EXT: &str = "jpg";

/// Extract frames from `video_path` into `output_dir` at roughly
/// `target_fps` frames per second of video.
///
/// Every `skip`-th decoded frame is written, `skip = floor(source_fps /
/// target_fps)` clamped to at least 1. Returns the written frame paths in
/// capture order (sorted by the numeric index in each filename).
pub async fn extract_frames(
    video_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    target_fps: f64,
) -> MediaResult<Vec<PathBuf>> {
    let video_path = video_path.as_ref();
    let output_dir = output_dir.as_ref();

    let info = probe_video(video_path).await?;
    let skip = compute_skip(info.fps, target_fps);
    debug!(
        "Sampling {} at {:.2} fps (source {:.2} fps, keeping every {} frames)",
        video_path.display(),
        target_fps,
        info.fps,
        skip
    );

    tokio::fs::create_dir_all(output_dir).await?;

    let pattern = output_dir.join(format!("{FRAME_PREFIX}%04d.{FRAME_EXT}"));
    let cmd = FfmpegCommand::new(video_path, &pattern)
        .video_filter(format!("select='not(mod(n,{skip}))'"))
        .output_args(["-vsync", "vfr"])
        .output_args(["-q:v", "2"]);

    FfmpegRunner::new().run(&cmd).await?;

    collect_frames(output_dir)
}

/// Number of decoded frames per kept frame.
///
/// The original formula divides by zero when the source is slower than the
/// target rate; clamp to 1 and keep every frame instead.
pub fn compute_skip(source_fps: f64, target_fps: f64) -> u32 {
    if target_fps <= 0.0 {
        return 1;
    }
    ((source_fps / target_fps).floor() as u32).max(1)
}

/// List extracted frames in capture order.
///
/// Files that do not match the `frame_NNNN.jpg` naming are ignored.
pub fn collect_frames(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut indexed: Vec<(u32, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(index) = frame_index(&name.to_string_lossy()) {
            indexed.push((index, entry.path()));
        }
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, path)| path).collect())
}

/// Parse the sequential index out of a `frame_NNNN.jpg` filename.
fn frame_index(name: &str) -> Option<u32> {
    name.strip_prefix(FRAME_PREFIX)?
        .strip_suffix(&format!(".{FRAME_EXT}"))?
        .parse()
        .ok()
}

/// Scoped ownership of one extracted frame file.
///
/// The file is deleted when the guard drops, so cleanup runs on every exit
/// path of an analysis loop, classifier failures included.
#[derive(Debug)]
pub struct FrameFile {
    path: PathBuf,
}

impl FrameFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FrameFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove frame file {}: {}", self.path.display(), e);
            }
        }
    }
}
