//! Webcam capture via an FFmpeg child process.
//!
//! The capture runs until it is cancelled through a `watch` channel or the
//! camera stops producing frames. Cancellation is graceful: `q` is written to
//! FFmpeg's stdin so the container gets finalized, with a kill fallback if the
//! encoder does not wind down in time.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::command::{stderr_tail, FfmpegCommand};
use crate::error::{MediaError, MediaResult};

/// How long to wait for FFmpeg to finalize the file after a graceful stop.
const STOP_GRACE_SECS: u64 = 10;

/// Camera input settings.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Capture device path (e.g. `/dev/video0`)
    pub device: String,
    /// FFmpeg input format (e.g. `v4l2`, `avfoundation`)
    pub input_format: String,
    /// Requested capture frame rate
    pub framerate: u32,
    /// Requested capture resolution, `WIDTHxHEIGHT`
    pub video_size: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            input_format: "v4l2".to_string(),
            framerate: 30,
            video_size: "640x480".to_string(),
        }
    }
}

/// Builder for a camera-capture FFmpeg command.
#[derive(Debug, Clone)]
pub struct CaptureCommand {
    settings: CaptureSettings,
    output: PathBuf,
}

impl CaptureCommand {
    pub fn new(settings: CaptureSettings, output: impl AsRef<Path>) -> Self {
        Self {
            settings,
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Build the underlying FFmpeg command.
    pub fn to_ffmpeg(&self) -> FfmpegCommand {
        FfmpegCommand::new(&self.settings.device, &self.output)
            .input_arg("-f")
            .input_arg(self.settings.input_format.as_str())
            .input_arg("-framerate")
            .input_arg(self.settings.framerate.to_string())
            .input_arg("-video_size")
            .input_arg(self.settings.video_size.as_str())
            .video_codec("libx264")
            .preset("veryfast")
            .pixel_format("yuv420p")
    }
}

/// How a capture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Stop was requested and the file was finalized.
    Stopped,
    /// FFmpeg exited on its own (camera stopped producing frames).
    Ended,
}

/// Run a camera capture until cancelled or the camera stops.
///
/// A device that cannot be opened surfaces as an explicit
/// [`MediaError::CaptureFailed`] carrying FFmpeg's stderr, never as a silent
/// empty recording.
pub async fn run_capture(
    cmd: &CaptureCommand,
    mut cancel_rx: watch::Receiver<bool>,
) -> MediaResult<CaptureOutcome> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let args = cmd.to_ffmpeg().build_args();
    debug!("Starting capture: ffmpeg {}", args.join(" "));

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().expect("stdin not captured");
    let mut stderr = child.stderr.take().expect("stderr not captured");
    let stderr_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf).await;
        buf
    });

    // The select only decides why we woke up; the child is handled after the
    // borrowed wait future has been dropped.
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = cancel_rx.changed() => None,
    };

    match exited {
        Some(status) => {
            // Camera stopped on its own, or the device could not be opened.
            let status = status?;
            let stderr_buf = stderr_handle.await.unwrap_or_default();
            if status.success() {
                info!("Capture ended: camera stopped producing frames");
                Ok(CaptureOutcome::Ended)
            } else {
                Err(MediaError::capture_failed(
                    format!(
                        "FFmpeg capture exited with status {}",
                        status
                            .code()
                            .map_or_else(|| "unknown".to_string(), |c| c.to_string())
                    ),
                    Some(stderr_tail(&stderr_buf)),
                ))
            }
        }
        None => {
            debug!("Capture cancel requested, finalizing output");
            // `q` asks FFmpeg to stop reading input and write the trailer.
            let _ = stdin.write_all(b"q\n").await;
            let _ = stdin.flush().await;
            drop(stdin);

            match tokio::time::timeout(Duration::from_secs(STOP_GRACE_SECS), child.wait()).await {
                Ok(Ok(status)) => {
                    if !status.success() {
                        warn!(
                            "FFmpeg exited with status {:?} after stop request",
                            status.code()
                        );
                    }
                }
                Ok(Err(e)) => warn!("Failed to wait for FFmpeg after stop request: {}", e),
                Err(_) => {
                    warn!("FFmpeg did not stop within {}s, killing", STOP_GRACE_SECS);
                    let _ = child.kill().await;
                }
            }
            let _ = stderr_handle.await;
            Ok(CaptureOutcome::Stopped)
        }
    }
}

/// Resolve a capture target path without overwriting an existing file.
///
/// Creates `directory` if needed. When `directory/filename` already exists,
/// a `_%Y%m%d%H%M%S` timestamp is appended before the extension.
pub fn unique_target_path(directory: impl AsRef<Path>, filename: &str) -> MediaResult<PathBuf> {
    let directory = directory.as_ref();
    std::fs::create_dir_all(directory)?;

    let path = directory.join(filename);
    if !path.exists() {
        return Ok(path);
    }

    let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let suffixed = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, timestamp),
    };
    Ok(directory.join(suffixed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_command_args() {
        let cmd = CaptureCommand::new(CaptureSettings::default(), "out.mp4");
        let args = cmd.to_ffmpeg().build_args();

        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], "v4l2");

        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i_pos + 1], "/dev/video0");
        // Input options must precede -i
        assert!(f_pos < i_pos);

        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_unique_target_path_fresh() {
        let dir = TempDir::new().unwrap();
        let path = unique_target_path(dir.path(), "output.mp4").unwrap();
        assert_eq!(path, dir.path().join("output.mp4"));
    }

    #[test]
    fn test_unique_target_path_suffixes_existing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("output.mp4"), b"x").unwrap();

        let path = unique_target_path(dir.path(), "output.mp4").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("output_"));
        assert!(name.ends_with(".mp4"));
        assert_ne!(path, dir.path().join("output.mp4"));
    }

    #[test]
    fn test_unique_target_path_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("recordings");
        let path = unique_target_path(&nested, "output.mp4").unwrap();
        assert!(nested.is_dir());
        assert_eq!(path, nested.join("output.mp4"));
    }
}
