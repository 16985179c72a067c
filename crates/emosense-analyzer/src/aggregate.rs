//! Video-to-emotion-sequence reduction.
//!
//! Samples a recording at a fixed rate, classifies each frame, assigns each a
//! coarse time bucket, and deletes every frame file on the way out. The
//! predominant emotion is the mode of the resulting label sequence.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use emosense_media::frames::{extract_frames, FrameFile};
use emosense_models::{EmotionLabel, EmotionSample};

use crate::client::EmotionClient;
use crate::error::AnalyzerResult;

/// Fixed sampling rate for analysis, in frames per second of video.
pub const ANALYSIS_FPS: f64 = 2.0;

/// Reduces recorded videos to classified emotion sequences.
#[derive(Debug, Clone)]
pub struct VideoAnalyzer {
    client: EmotionClient,
}

impl VideoAnalyzer {
    pub fn new(client: EmotionClient) -> Self {
        Self { client }
    }

    /// Sample `video_path` at [`ANALYSIS_FPS`], classify every frame, and
    /// return the ordered `(bucket, emotion)` sequence.
    ///
    /// `frame_rate` is the samples-per-bucket divisor: the bucket counter
    /// starts at 1 and advances every `frame_rate` samples, so with the
    /// default of 2 a bucket covers one second of video.
    pub async fn process_video(
        &self,
        frame_rate: u32,
        video_path: impl AsRef<Path>,
        frames_dir: impl AsRef<Path>,
    ) -> AnalyzerResult<Vec<EmotionSample>> {
        let video_path = video_path.as_ref();
        let frames = extract_frames(video_path, frames_dir, ANALYSIS_FPS).await?;
        info!(
            "Extracted {} frames from {}",
            frames.len(),
            video_path.display()
        );
        Ok(self.analyze_frames(frames, frame_rate).await)
    }

    /// Classify a frame sequence in capture order.
    ///
    /// Classification failures degrade to the no-face sentinel rather than
    /// aborting the sequence. Each frame file is deleted as soon as its
    /// sample is recorded, whatever the classification outcome.
    pub async fn analyze_frames(
        &self,
        frames: Vec<PathBuf>,
        frame_rate: u32,
    ) -> Vec<EmotionSample> {
        let frame_rate = frame_rate.max(1);
        let mut samples = Vec::with_capacity(frames.len());
        let mut bucket = 0u32;

        for (index, path) in frames.into_iter().enumerate() {
            let frame = FrameFile::new(path);
            if index as u32 % frame_rate == 0 {
                bucket += 1;
            }

            let label = match self.client.classify(frame.path()).await {
                Ok(label) => label,
                Err(e) => {
                    warn!(
                        "Classification failed for {}, recording as no face: {}",
                        frame.path().display(),
                        e
                    );
                    EmotionLabel::NoFace
                }
            };
            samples.push(EmotionSample::new(bucket, label));
        }

        samples
    }
}

/// The most frequent label in the sequence; ties go to the label seen first.
pub fn predominant_emotion(samples: &[EmotionSample]) -> Option<EmotionLabel> {
    let mut counts: Vec<(EmotionLabel, usize)> = Vec::new();

    for sample in samples {
        match counts.iter_mut().find(|(label, _)| *label == sample.label) {
            Some((_, count)) => *count += 1,
            None => counts.push((sample.label, 1)),
        }
    }

    // Counts are in first-encountered order; only a strictly greater count
    // displaces the current best, so ties keep the earliest label.
    let mut best: Option<(EmotionLabel, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::DEFAULT_TIMEOUT;

    fn sample(bucket: u32, label: EmotionLabel) -> EmotionSample {
        EmotionSample::new(bucket, label)
    }

    #[test]
    fn test_predominant_is_mode() {
        let samples = vec![
            sample(1, EmotionLabel::Neutral),
            sample(1, EmotionLabel::Happy),
            sample(2, EmotionLabel::Happy),
            sample(2, EmotionLabel::Sad),
        ];
        assert_eq!(predominant_emotion(&samples), Some(EmotionLabel::Happy));
    }

    #[test]
    fn test_predominant_tie_goes_to_first_seen() {
        let samples = vec![
            sample(1, EmotionLabel::Sad),
            sample(1, EmotionLabel::Happy),
            sample(2, EmotionLabel::Happy),
            sample(2, EmotionLabel::Sad),
        ];
        assert_eq!(predominant_emotion(&samples), Some(EmotionLabel::Sad));
    }

    #[test]
    fn test_predominant_sentinel_is_eligible() {
        let samples = vec![
            sample(1, EmotionLabel::NoFace),
            sample(1, EmotionLabel::NoFace),
            sample(2, EmotionLabel::Happy),
        ];
        assert_eq!(predominant_emotion(&samples), Some(EmotionLabel::NoFace));
    }

    #[test]
    fn test_predominant_empty_sequence() {
        assert_eq!(predominant_emotion(&[]), None);
    }

    fn write_frames(dir: &TempDir, count: usize) -> Vec<std::path::PathBuf> {
        (1..=count)
            .map(|i| {
                let path = dir.path().join(format!("frame_{:04}.jpg", i));
                std::fs::write(&path, b"jpeg bytes").unwrap();
                path
            })
            .collect()
    }

    async fn analyzer_for(server: &MockServer) -> VideoAnalyzer {
        VideoAnalyzer::new(EmotionClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_frames_buckets_and_cleanup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"dominant_emotion": "happy", "face_confidence": 0.9}]
            })))
            .expect(5)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let frames = write_frames(&dir, 5);

        let analyzer = analyzer_for(&server).await;
        let samples = analyzer.analyze_frames(frames.clone(), 2).await;

        let buckets: Vec<u32> = samples.iter().map(|s| s.bucket).collect();
        assert_eq!(buckets, [1, 1, 2, 2, 3]);
        assert!(samples.iter().all(|s| s.label == EmotionLabel::Happy));

        for frame in frames {
            assert!(!frame.exists(), "{} should be deleted", frame.display());
        }
    }

    #[tokio::test]
    async fn test_analyze_frames_degrades_failures_and_still_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let frames = write_frames(&dir, 3);

        let analyzer = analyzer_for(&server).await;
        let samples = analyzer.analyze_frames(frames.clone(), 2).await;

        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.label == EmotionLabel::NoFace));

        for frame in frames {
            assert!(!frame.exists(), "{} should be deleted", frame.display());
        }
    }

    #[tokio::test]
    async fn test_analyze_frames_zero_frame_rate_treated_as_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"dominant_emotion": "neutral", "face_confidence": 0.8}]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let frames = write_frames(&dir, 3);

        let analyzer = analyzer_for(&server).await;
        let samples = analyzer.analyze_frames(frames, 0).await;
        let buckets: Vec<u32> = samples.iter().map(|s| s.bucket).collect();
        assert_eq!(buckets, [1, 2, 3]);
    }
}
