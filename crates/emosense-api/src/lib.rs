//! Axum HTTP API server.
//!
//! This crate provides:
//! - The recording start/stop, evaluation, and analysis routes
//! - The single-owner recording controller
//! - Environment-based configuration and typed API errors

pub mod config;
pub mod error;
pub mod handlers;
pub mod recorder;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use recorder::RecordingController;
pub use routes::create_router;
pub use state::AppState;
