//! Single-owner recording controller.
//!
//! All start/stop transitions serialize through one mutex-held slot, so a
//! start racing another start (or a capture winding down) can never observe a
//! stale "idle" state or spawn a second capture task. The background task
//! owns the FFmpeg child; stopping goes through a watch-channel cancel signal.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use emosense_db::Database;
use emosense_media::capture::unique_target_path;
use emosense_media::{run_capture, CaptureCommand, CaptureSettings};

/// Recording state errors.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Recording is already in progress")]
    AlreadyInProgress,

    #[error("No recording in progress")]
    NotInProgress,

    #[error("media error: {0}")]
    Media(#[from] emosense_media::MediaError),
}

struct ActiveRecording {
    path: PathBuf,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

type ActiveSlot = Arc<Mutex<Option<ActiveRecording>>>;

/// Owner of the one-at-a-time webcam capture.
pub struct RecordingController {
    db: Database,
    settings: CaptureSettings,
    active: ActiveSlot,
}

impl RecordingController {
    pub fn new(db: Database, settings: CaptureSettings) -> Self {
        Self {
            db,
            settings,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Start a capture for an evaluation/stimulus pair.
    ///
    /// Fails with [`RecorderError::AlreadyInProgress`] while a capture is
    /// active, without side effects. The target path gets a timestamp suffix
    /// when `directory/filename` already exists.
    pub async fn start(
        &self,
        directory: &str,
        filename: &str,
        evaluation_id: i64,
        stimulus_id: i64,
    ) -> Result<PathBuf, RecorderError> {
        // The lock is held across the spawn, so the conflict check and the
        // state transition are one step.
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(RecorderError::AlreadyInProgress);
        }

        let path = unique_target_path(directory, filename)?;
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let cmd = CaptureCommand::new(self.settings.clone(), &path);

        let db = self.db.clone();
        let slot = Arc::clone(&self.active);
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            capture_task(cmd, cancel_rx, db, slot, task_path, evaluation_id, stimulus_id).await;
        });

        *active = Some(ActiveRecording {
            path: path.clone(),
            cancel_tx,
            handle,
        });
        info!(
            "Recording started: {} (evaluation {}, stimulus {})",
            path.display(),
            evaluation_id,
            stimulus_id
        );
        Ok(path)
    }

    /// Stop the active capture and report its file path.
    ///
    /// Waits for the capture task to wind down, so the recording row has been
    /// inserted by the time this returns.
    pub async fn stop(&self) -> Result<PathBuf, RecorderError> {
        let entry = self.active.lock().await.take();
        let Some(ActiveRecording {
            path,
            cancel_tx,
            handle,
        }) = entry
        else {
            return Err(RecorderError::NotInProgress);
        };

        let _ = cancel_tx.send(true);
        if let Err(e) = handle.await {
            error!("Capture task failed to join: {}", e);
        }
        info!("Recording stopped: {}", path.display());
        Ok(path)
    }

    /// Whether a capture is currently active.
    pub async fn is_recording(&self) -> bool {
        self.active.lock().await.is_some()
    }
}

/// Background capture: drive FFmpeg until stopped or the camera stops, then
/// record the result and clear the active slot.
async fn capture_task(
    cmd: CaptureCommand,
    cancel_rx: watch::Receiver<bool>,
    db: Database,
    slot: ActiveSlot,
    path: PathBuf,
    evaluation_id: i64,
    stimulus_id: i64,
) {
    match run_capture(&cmd, cancel_rx).await {
        Ok(outcome) => {
            info!("Capture finished ({:?}): {}", outcome, path.display());
            if let Err(e) = db
                .insert_recording(evaluation_id, stimulus_id, &path.to_string_lossy())
                .await
            {
                error!(
                    "Failed to insert recording row for {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Err(e) => error!("Capture failed for {}: {}", path.display(), e),
    }

    *slot.lock().await = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn controller() -> RecordingController {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        RecordingController::new(db, CaptureSettings::default())
    }

    /// Install a fake active capture that waits on its cancel signal, the way
    /// a real FFmpeg task does.
    async fn install_fake_capture(controller: &RecordingController, path: &str) {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let slot = Arc::clone(&controller.active);
        let handle = tokio::spawn(async move {
            let _ = cancel_rx.changed().await;
            *slot.lock().await = None;
        });
        *controller.active.lock().await = Some(ActiveRecording {
            path: PathBuf::from(path),
            cancel_tx,
            handle,
        });
    }

    #[tokio::test]
    async fn test_stop_without_active_recording() {
        let controller = controller().await;
        let err = controller.stop().await.unwrap_err();
        assert!(matches!(err, RecorderError::NotInProgress));
    }

    #[tokio::test]
    async fn test_start_while_active_is_rejected() {
        let controller = controller().await;
        install_fake_capture(&controller, "recordings/busy.mp4").await;

        let dir = tempfile::TempDir::new().unwrap();
        let err = controller
            .start(&dir.path().to_string_lossy(), "output.mp4", 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::AlreadyInProgress));

        // The rejected start must not have replaced the active capture.
        assert!(controller.is_recording().await);
    }

    #[tokio::test]
    async fn test_stop_reports_path_and_clears_state() {
        let controller = controller().await;
        install_fake_capture(&controller, "recordings/session.mp4").await;

        let path = controller.stop().await.unwrap();
        assert_eq!(path, PathBuf::from("recordings/session.mp4"));
        assert!(!controller.is_recording().await);

        // A second stop is a state conflict again.
        let err = controller.stop().await.unwrap_err();
        assert!(matches!(err, RecorderError::NotInProgress));
    }
}
