//! HTTP client for the external facial-analysis service.
//!
//! The service exposes the DeepFace-style `/analyze` endpoint: it takes a
//! base64 data-URI image and a list of analysis actions, and returns one
//! result per detected face. Detection is not enforced, so an empty frame is
//! a normal response, not an error.

use std::path::Path;
use std::time::Duration;

use base64::prelude::*;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use emosense_models::EmotionLabel;

use crate::error::{AnalyzerError, AnalyzerResult};

/// Default request timeout for classification calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the facial-analysis service.
#[derive(Debug, Clone)]
pub struct EmotionClient {
    base_url: String,
    http: Client,
}

/// Analysis request body.
#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    /// Base64 data URI of the frame image
    img: String,
    actions: Vec<&'static str>,
    enforce_detection: bool,
}

/// Analysis response body.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    results: Vec<FaceResult>,
}

#[derive(Debug, Deserialize)]
struct FaceResult {
    dominant_emotion: Option<String>,
    /// Confidence that the analyzed region is a face; 0.0 when detection
    /// fell back to the whole frame.
    face_confidence: Option<f64>,
}

impl EmotionClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AnalyzerResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Classify the emotion in one frame image.
    ///
    /// Returns [`EmotionLabel::NoFace`] when the service finds no face;
    /// transport failures and malformed responses are real errors and left to
    /// the caller's degrade policy.
    pub async fn classify(&self, frame_path: impl AsRef<Path>) -> AnalyzerResult<EmotionLabel> {
        let frame_path = frame_path.as_ref();
        let bytes = tokio::fs::read(frame_path).await?;

        let request = AnalyzeRequest {
            img: format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(&bytes)),
            actions: vec!["emotion"],
            enforce_detection: false,
        };

        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            // The service rejects frames it cannot find a face in.
            debug!("Analysis service found no face in {}", frame_path.display());
            return Ok(EmotionLabel::NoFace);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AnalyzeResponse = response.json().await?;
        let Some(face) = body.results.first() else {
            return Ok(EmotionLabel::NoFace);
        };
        if face.face_confidence == Some(0.0) {
            return Ok(EmotionLabel::NoFace);
        }

        let dominant = face.dominant_emotion.as_deref().ok_or_else(|| {
            AnalyzerError::UnexpectedResponse("result missing dominant_emotion".to_string())
        })?;
        Ok(dominant.parse()?)
    }
}
