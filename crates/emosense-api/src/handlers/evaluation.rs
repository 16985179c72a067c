//! Evaluation session handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

/// Request to start an evaluation session.
#[derive(Debug, Deserialize)]
pub struct StartEvaluationRequest {
    #[serde(rename = "PruebaID")]
    pub test_id: i64,
    #[serde(rename = "EstudianteID")]
    pub student_id: i64,
}

#[derive(Serialize)]
pub struct StartEvaluationResponse {
    pub message: String,
    #[serde(rename = "IDEval")]
    pub evaluation_id: i64,
}

/// Open an evaluation session; the generated ID keys every later call.
pub async fn start_evaluation(
    State(state): State<AppState>,
    Json(request): Json<StartEvaluationRequest>,
) -> ApiResult<Json<StartEvaluationResponse>> {
    let evaluation_id = state
        .db
        .insert_evaluation(request.test_id, request.student_id)
        .await?;

    Ok(Json(StartEvaluationResponse {
        message: "Evaluation started".to_string(),
        evaluation_id,
    }))
}
