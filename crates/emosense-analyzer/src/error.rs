//! Error types for emotion analysis.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur while classifying frames.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analysis service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected analysis service response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    UnknownLabel(#[from] emosense_models::ParseEmotionError),

    #[error("media error: {0}")]
    Media(#[from] emosense_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
