//! Video analysis handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use emosense_analyzer::predominant_emotion;
use emosense_models::{AnalysisRecord, EmotionLabel, EmotionSample};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn default_frame_rate() -> u32 {
    2
}

/// Request to analyze the recording of an evaluation/stimulus pair.
#[derive(Debug, Deserialize)]
pub struct AnalyzeVideoRequest {
    /// Working directory for transient frames; defaults to the configured
    /// frames dir.
    #[serde(default)]
    pub output_folder: Option<String>,
    /// Samples-per-bucket divisor for the returned time buckets.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(rename = "IDEval")]
    pub evaluation_id: i64,
    #[serde(rename = "EstimuloName")]
    pub stimulus_name: String,
    #[serde(rename = "PruebaID")]
    pub test_id: i64,
    #[serde(rename = "RespuestaEstudiante")]
    #[serde(default)]
    pub student_answer: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeVideoResponse {
    pub predominant_emotion: EmotionLabel,
    pub full_analysis: Vec<EmotionSample>,
}

/// Run the extract → classify → aggregate → persist pipeline for the
/// recording identified by `(IDEval, EstimuloName)`.
pub async fn analyze_video(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeVideoRequest>,
) -> ApiResult<Json<AnalyzeVideoResponse>> {
    if request.frame_rate == 0 {
        return Err(ApiError::bad_request("frame_rate must be at least 1"));
    }

    let stimulus_id = state
        .db
        .stimulus_id(&request.stimulus_name)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Unknown stimulus: {}", request.stimulus_name))
        })?;

    let video_path = state
        .db
        .recording_path(request.evaluation_id, stimulus_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No recording found for evaluation {} and stimulus {}",
                request.evaluation_id, request.stimulus_name
            ))
        })?;

    let frames_dir = request
        .output_folder
        .unwrap_or_else(|| state.config.frames_dir.clone());

    let samples = state
        .analyzer
        .process_video(request.frame_rate, &video_path, &frames_dir)
        .await?;

    let predominant = predominant_emotion(&samples).ok_or_else(|| {
        ApiError::internal(format!("No frames were extracted from {video_path}"))
    })?;

    info!(
        "Analyzed {} samples for evaluation {} (predominant: {})",
        samples.len(),
        request.evaluation_id,
        predominant
    );

    let record = AnalysisRecord {
        evaluation_id: request.evaluation_id,
        test_id: request.test_id,
        stimulus_id,
        predominant_emotion: predominant,
        samples: samples.clone(),
        student_answer: request.student_answer,
        video_path,
    };
    state.db.insert_analysis(&record).await?;

    Ok(Json(AnalyzeVideoResponse {
        predominant_emotion: predominant,
        full_analysis: samples,
    }))
}
