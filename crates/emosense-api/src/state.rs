//! Application state.

use std::sync::Arc;

use emosense_analyzer::{EmotionClient, VideoAnalyzer};
use emosense_db::Database;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::recorder::RecordingController;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub db: Database,
    pub recorder: Arc<RecordingController>,
    pub analyzer: Arc<VideoAnalyzer>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        let db = Database::connect(&config.database_url).await?;

        let client = EmotionClient::new(config.analyzer_url.clone(), config.analyzer_timeout)?;
        let analyzer = Arc::new(VideoAnalyzer::new(client));

        let recorder = Arc::new(RecordingController::new(db.clone(), config.capture.clone()));

        Ok(Self {
            config,
            db,
            recorder,
            analyzer,
        })
    }
}
