//! Recording start/stop handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request to start a webcam recording.
#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Target directory; defaults to the configured recordings dir.
    #[serde(default)]
    pub directory: Option<String>,
    /// Target filename; defaults to `output.mp4`.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "IDEval")]
    pub evaluation_id: i64,
    #[serde(rename = "EstimuloName")]
    pub stimulus_name: String,
}

#[derive(Serialize)]
pub struct StartRecordingResponse {
    pub message: String,
}

/// Start recording the webcam for an evaluation/stimulus pair.
pub async fn start_recording(
    State(state): State<AppState>,
    Json(request): Json<StartRecordingRequest>,
) -> ApiResult<Json<StartRecordingResponse>> {
    let stimulus_id = state
        .db
        .stimulus_id(&request.stimulus_name)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Unknown stimulus: {}", request.stimulus_name))
        })?;

    let directory = request
        .directory
        .unwrap_or_else(|| state.config.recordings_dir.clone());
    let filename = request.filename.unwrap_or_else(|| "output.mp4".to_string());

    let path = state
        .recorder
        .start(&directory, &filename, request.evaluation_id, stimulus_id)
        .await?;

    info!(
        "Recording requested for evaluation {} -> {}",
        request.evaluation_id,
        path.display()
    );

    Ok(Json(StartRecordingResponse {
        message: "Recording started".to_string(),
    }))
}

#[derive(Serialize)]
pub struct StopRecordingResponse {
    pub message: String,
    pub file_path: String,
}

/// Stop the active recording and report the file it produced.
pub async fn stop_recording(
    State(state): State<AppState>,
) -> ApiResult<Json<StopRecordingResponse>> {
    let path = state.recorder.stop().await?;

    Ok(Json(StopRecordingResponse {
        message: "Recording stopped".to_string(),
        file_path: path.to_string_lossy().to_string(),
    }))
}
