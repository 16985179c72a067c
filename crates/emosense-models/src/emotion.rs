//! Emotion label vocabulary and per-frame samples.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Literal label reported when the analysis service finds no face in a frame.
pub const NO_FACE_LABEL: &str = "No face detected";

/// Emotion classification label.
///
/// The seven concrete variants are the closed vocabulary of the external
/// facial-analysis model. [`EmotionLabel::NoFace`] is the sentinel used when a
/// frame has no detectable face; downstream aggregation treats it like any
/// other label, so a mostly-empty video reports `"No face detected"` as its
/// predominant emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
    /// No face was detected in the frame.
    NoFace,
}

impl EmotionLabel {
    /// All concrete (non-sentinel) labels the classifier can produce.
    pub const VOCABULARY: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::NoFace => NO_FACE_LABEL,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not part of the label vocabulary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown emotion label: {0:?}")]
pub struct ParseEmotionError(pub String);

impl FromStr for EmotionLabel {
    type Err = ParseEmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "angry" => Ok(EmotionLabel::Angry),
            "disgust" => Ok(EmotionLabel::Disgust),
            "fear" => Ok(EmotionLabel::Fear),
            "happy" => Ok(EmotionLabel::Happy),
            "sad" => Ok(EmotionLabel::Sad),
            "surprise" => Ok(EmotionLabel::Surprise),
            "neutral" => Ok(EmotionLabel::Neutral),
            NO_FACE_LABEL => Ok(EmotionLabel::NoFace),
            other => Err(ParseEmotionError(other.to_string())),
        }
    }
}

impl Serialize for EmotionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmotionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One classified frame: a coarse time bucket and the emotion seen in it.
///
/// Serializes as a two-element array `[bucket, "label"]`, the format used by
/// both the HTTP response and the `analysis_results.samples` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionSample {
    /// 1-based time bucket the frame falls into.
    pub bucket: u32,
    pub label: EmotionLabel,
}

impl EmotionSample {
    pub fn new(bucket: u32, label: EmotionLabel) -> Self {
        Self { bucket, label }
    }
}

impl Serialize for EmotionSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.bucket)?;
        tup.serialize_element(&self.label)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for EmotionSample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SampleVisitor;

        impl<'de> Visitor<'de> for SampleVisitor {
            type Value = EmotionSample;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a [bucket, label] pair")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let bucket = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let label = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                Ok(EmotionSample { bucket, label })
            }
        }

        deserializer.deserialize_tuple(2, SampleVisitor)
    }
}
