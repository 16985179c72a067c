//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::recorder::RecorderError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error("Database error: {0}")]
    Db(#[from] emosense_db::DbError),

    #[error("Media error: {0}")]
    Media(#[from] emosense_media::MediaError),

    #[error("Analysis error: {0}")]
    Analyzer(#[from] emosense_analyzer::AnalyzerError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // Recording state conflicts are part of the wire contract as 400s.
            ApiError::BadRequest(_)
            | ApiError::Recorder(RecorderError::AlreadyInProgress)
            | ApiError::Recorder(RecorderError::NotInProgress) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_)
            | ApiError::Recorder(RecorderError::Media(_))
            | ApiError::Db(_)
            | ApiError::Media(_)
            | ApiError::Analyzer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let error = match &self {
            ApiError::Internal(_)
            | ApiError::Recorder(RecorderError::Media(_))
            | ApiError::Db(_)
            | ApiError::Media(_)
            | ApiError::Analyzer(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
