//! API configuration.

use std::time::Duration;

use emosense_media::CaptureSettings;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Database connection URL
    pub database_url: String,
    /// Base URL of the facial-analysis service
    pub analyzer_url: String,
    /// Request timeout for classification calls
    pub analyzer_timeout: Duration,
    /// Default directory for finished recordings
    pub recordings_dir: String,
    /// Default directory for transient frame images
    pub frames_dir: String,
    /// Camera capture settings
    pub capture: CaptureSettings,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            database_url: "sqlite://emosense.db".to_string(),
            analyzer_url: "http://127.0.0.1:5005".to_string(),
            analyzer_timeout: Duration::from_secs(30),
            recordings_dir: "recordings".to_string(),
            frames_dir: "recordings/frames".to_string(),
            capture: CaptureSettings::default(),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let capture_defaults = CaptureSettings::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            analyzer_url: std::env::var("ANALYZER_URL").unwrap_or(defaults.analyzer_url),
            analyzer_timeout: Duration::from_secs(
                std::env::var("ANALYZER_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            recordings_dir: std::env::var("RECORDINGS_DIR").unwrap_or(defaults.recordings_dir),
            frames_dir: std::env::var("FRAMES_DIR").unwrap_or(defaults.frames_dir),
            capture: CaptureSettings {
                device: std::env::var("CAMERA_DEVICE").unwrap_or(capture_defaults.device),
                input_format: std::env::var("CAMERA_INPUT_FORMAT")
                    .unwrap_or(capture_defaults.input_format),
                framerate: std::env::var("CAMERA_FRAMERATE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(capture_defaults.framerate),
                video_size: std::env::var("CAMERA_VIDEO_SIZE")
                    .unwrap_or(capture_defaults.video_size),
            },
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
