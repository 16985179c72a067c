//! Analysis records persisted by the gateway.

use serde::{Deserialize, Serialize};

use crate::emotion::{EmotionLabel, EmotionSample};

/// Full result of analyzing one recording, as handed to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub evaluation_id: i64,
    pub test_id: i64,
    pub stimulus_id: i64,
    pub predominant_emotion: EmotionLabel,
    /// Ordered classified samples, stored as a JSON array of
    /// `[bucket, label]` pairs.
    pub samples: Vec<EmotionSample>,
    /// The student's free-text answer to the stimulus, if any.
    pub student_answer: Option<String>,
    pub video_path: String,
}
