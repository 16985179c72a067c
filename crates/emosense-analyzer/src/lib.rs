//! Emotion analysis for recorded videos.
//!
//! Wraps the external facial-analysis HTTP service behind a typed client and
//! reduces a sampled frame sequence to ordered `(time bucket, emotion)` pairs.

pub mod aggregate;
pub mod client;
pub mod error;

pub use aggregate::{predominant_emotion, VideoAnalyzer, ANALYSIS_FPS};
pub use client::EmotionClient;
pub use error::{AnalyzerError, AnalyzerResult};
