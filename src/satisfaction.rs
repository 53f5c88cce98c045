//! Satisfaction score and feedback-source weights.
//!
//! The source weight is reported alongside the score but does not change it.

use serde::{Deserialize, Serialize};

use crate::sentiment::{round_to, Sentiment};

pub const MIN_SATISFACTION: f32 = 1.0;
pub const MAX_SATISFACTION: f32 = 10.0;
const BASE_SATISFACTION: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    Client,
    Manager,
    Peer,
    #[serde(rename = "self")]
    SelfReview,
    Other,
}

impl FeedbackSource {
    /// Case-insensitive; anything unrecognised is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "client" => FeedbackSource::Client,
            "manager" => FeedbackSource::Manager,
            "peer" => FeedbackSource::Peer,
            "self" => FeedbackSource::SelfReview,
            _ => FeedbackSource::Other,
        }
    }

    /// Informational weight on satisfaction.
    pub fn satisfaction_weight(self) -> f32 {
        match self {
            FeedbackSource::Client => 1.1,
            FeedbackSource::Manager => 1.05,
            FeedbackSource::Peer => 1.0,
            FeedbackSource::SelfReview => 0.95,
            FeedbackSource::Other => 1.0,
        }
    }

    /// Multiplier on the qualitative score in performance evaluation.
    pub fn evaluation_weight(self) -> f32 {
        match self {
            FeedbackSource::Client => 1.2,
            FeedbackSource::Manager => 1.1,
            FeedbackSource::Peer => 1.0,
            FeedbackSource::SelfReview => 0.8,
            FeedbackSource::Other => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionScore {
    /// Clamped to [1, 10], rounded to 1 decimal.
    pub score: f32,
    pub source_weight: f32,
}

pub fn satisfaction_score(
    sentiment: Sentiment,
    confidence: f32,
    source: FeedbackSource,
) -> SatisfactionScore {
    let confidence = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = match sentiment {
        Sentiment::Positive => BASE_SATISFACTION + BASE_SATISFACTION * confidence,
        Sentiment::Negative => BASE_SATISFACTION - BASE_SATISFACTION * confidence,
        Sentiment::Neutral => BASE_SATISFACTION,
    };
    // TODO: apply source_weight once product decides whether it scales the
    // score or the delta from 5.0.
    SatisfactionScore {
        score: round_to(raw.clamp(MIN_SATISFACTION, MAX_SATISFACTION), 1),
        source_weight: source.satisfaction_weight(),
    }
}
