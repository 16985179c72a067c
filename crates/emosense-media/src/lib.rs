//! FFmpeg CLI wrappers for the emosense backend.
//!
//! Everything that touches a camera or a video file goes through an
//! `ffmpeg`/`ffprobe` child process; this crate owns building those
//! commands, running them, and the filesystem conventions around the
//! frames they produce.

pub mod capture;
pub mod command;
pub mod error;
pub mod frames;
pub mod probe;

pub use capture::{run_capture, CaptureCommand, CaptureOutcome, CaptureSettings};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{extract_frames, FrameFile};
pub use probe::{probe_video, VideoInfo};
