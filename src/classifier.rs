//! External sentence classifier: provider abstraction + concrete providers.
//!
//! The classifier is a black box returning a 1..=5 star rating with a
//! confidence. Every failure is a `ClassifierError`; the scorer decides what
//! to do with it (rule-based substitute for that sentence).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::sentiment::Sentiment;

pub const ENV_CLASSIFIER_TEST_MODE: &str = "CLASSIFIER_TEST_MODE";

/// Ordinal 5-level label with the provider's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRating {
    stars: u8,
    confidence: f32,
}

impl StarRating {
    /// Rejects stars outside 1..=5 and non-finite confidences; clamps the
    /// confidence into [0, 1].
    pub fn new(stars: u8, confidence: f32) -> Result<Self, ClassifierError> {
        if !(1..=5).contains(&stars) {
            return Err(ClassifierError::BadResponse(format!(
                "star label out of range: {stars}"
            )));
        }
        if !confidence.is_finite() {
            return Err(ClassifierError::BadResponse(
                "non-finite confidence".to_string(),
            ));
        }
        Ok(Self {
            stars,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    pub fn stars(&self) -> u8 {
        self.stars
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// 1-2 negative, 3 neutral, 4-5 positive.
    pub fn sentiment(&self) -> Sentiment {
        match self.stars {
            1 | 2 => Sentiment::Negative,
            3 => Sentiment::Neutral,
            _ => Sentiment::Positive,
        }
    }
}

pub type ClassifyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<StarRating, ClassifierError>> + Send + 'a>>;

pub trait SentenceClassifier: Send + Sync {
    fn classify<'a>(&'a self, sentence: &'a str) -> ClassifyFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
    fn is_enabled(&self) -> bool {
        true
    }
}

pub type DynClassifier = Arc<dyn SentenceClassifier>;

/// Always unavailable; every sentence takes the rule-based path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

impl SentenceClassifier for DisabledClassifier {
    fn classify<'a>(&'a self, _sentence: &'a str) -> ClassifyFuture<'a> {
        Box::pin(async { Err(ClassifierError::Unavailable) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
    fn is_enabled(&self) -> bool {
        false
    }
}

/// Deterministic classifier returning the same rating for every sentence.
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    pub rating: StarRating,
}

impl FixedClassifier {
    pub fn new(rating: StarRating) -> Self {
        Self { rating }
    }

    /// Neutral rating used by `CLASSIFIER_TEST_MODE=mock`.
    pub fn mock() -> Self {
        Self {
            rating: StarRating {
                stars: 3,
                confidence: 0.6,
            },
        }
    }
}

impl SentenceClassifier for FixedClassifier {
    fn classify<'a>(&'a self, _sentence: &'a str) -> ClassifyFuture<'a> {
        let rating = self.rating;
        Box::pin(async move { Ok(rating) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Hosted inference endpoint (Hugging Face style) for the multilingual
/// 5-star sentiment model.
pub struct HuggingFaceClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HuggingFaceClassifier {
    pub fn new(cfg: &ClassifierConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("reward-nlp-engine/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint_url(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Leading digit of labels like `"4 stars"` / `"1 star"`.
pub fn parse_star_label(label: &str) -> Option<u8> {
    let digit = label.trim().chars().next()?.to_digit(10)?;
    u8::try_from(digit).ok().filter(|d| (1..=5).contains(d))
}

/// Picks the highest-scoring label out of a raw inference body.
pub fn rating_from_response(body: &str) -> Result<StarRating, ClassifierError> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::BadResponse(e.to_string()))?;
    let labels = match parsed {
        InferenceResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(flat) => flat,
    };
    let best = labels
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or(ClassifierError::EmptyResult)?;
    let stars = parse_star_label(&best.label)
        .ok_or_else(|| ClassifierError::BadResponse(format!("unknown label: {}", best.label)))?;
    StarRating::new(stars, best.score)
}

impl SentenceClassifier for HuggingFaceClassifier {
    fn classify<'a>(&'a self, sentence: &'a str) -> ClassifyFuture<'a> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return Err(ClassifierError::Unavailable);
            }

            #[derive(Serialize)]
            struct Req<'a> {
                inputs: &'a str,
            }

            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&Req { inputs: sentence })
                .send()
                .await
                .map_err(|e| ClassifierError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(ClassifierError::Transport(format!("http status {status}")));
            }

            let body = resp
                .text()
                .await
                .map_err(|e| ClassifierError::Transport(e.to_string()))?;
            rating_from_response(&body)
        })
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}

/// Factory: build a classifier according to config and environment.
///
/// * `CLASSIFIER_TEST_MODE=mock` returns a deterministic mock.
/// * `enabled == false` returns a disabled classifier.
/// * Otherwise the configured provider; construction failures degrade to
///   disabled with a warning.
pub fn build_classifier(cfg: &ClassifierConfig) -> DynClassifier {
    if std::env::var(ENV_CLASSIFIER_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(FixedClassifier::mock());
    }

    if !cfg.enabled {
        return Arc::new(DisabledClassifier);
    }

    match cfg.provider.as_str() {
        "huggingface" => match HuggingFaceClassifier::new(cfg) {
            Ok(c) => Arc::new(c),
            Err(error) => {
                warn!(target: "classifier", %error, "http client init failed; classifier disabled");
                Arc::new(DisabledClassifier)
            }
        },
        "mock" => Arc::new(FixedClassifier::mock()),
        _ => Arc::new(DisabledClassifier),
    }
}
