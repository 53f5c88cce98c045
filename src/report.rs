//! report.rs - result shapes returned by the pipeline.
//!
//! Everything here is produced fresh per request and serialized as-is into
//! the `data` field of the HTTP envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dispute::{DisputeType, Recommendation, RiskFactor, RiskLevel};
use crate::key_points::SalienceSignals;
use crate::keywords::PolarityCounts;
use crate::language::Language;
use crate::performance::{CombinedAssessment, QualitativeAssessment, QuantitativeAssessment};
use crate::sentiment::{ModelUsed, Sentiment, SentenceVerdict};

/// Inputs that drove a feedback verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackExplainability {
    pub language_detected: Language,
    /// Performance-keyword hits over the whole text.
    pub keyword_balance: PolarityCounts,
    /// Strong-indicator tokens over the whole text.
    pub indicator_balance: IndicatorBalance,
    pub model_used: ModelUsed,
    /// Informational; does not alter `satisfaction_score`.
    pub source_weight: f32,
    pub key_points_reasoning: String,
    /// Salience breakdown of each returned key point, same order.
    pub key_point_signals: Vec<SalienceSignals>,
    pub satisfaction_calculation: String,
    pub recommendation_basis: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorBalance {
    pub positive: usize,
    pub negative: usize,
    pub eligible_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    pub sentiment: Sentiment,
    /// In [0, 1], 2 decimals.
    pub confidence: f32,
    pub language: Language,
    pub key_points: Vec<String>,
    /// In [1, 10], 1 decimal.
    pub satisfaction_score: f32,
    pub recommendations: Vec<String>,
    pub explainability: FeedbackExplainability,
    /// Per-sentence verdicts that were aggregated.
    pub sentences: Vec<SentenceVerdict>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// RFC 3339.
    pub processed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeAnalysis {
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub language: Language,
    pub dispute_type: DisputeType,
    /// Matched dispute phrases in lexicon order.
    pub dispute_keywords: Vec<String>,
    pub recommendation: Recommendation,
    /// Always 0; adjustments are decided by the reward engine.
    pub suggested_adjustment: i64,
    pub reasoning: String,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub risk_factors: Vec<RiskFactor>,
    pub evidence_count: usize,
    pub commission_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub processed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEvaluation {
    pub employee_id: String,
    pub role: String,
    pub quantitative_assessment: QuantitativeAssessment,
    pub qualitative_assessment: QualitativeAssessment,
    pub combined_assessment: CombinedAssessment,
    pub recommendations: Vec<String>,
    pub processed_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierInfo {
    pub provider: String,
    pub enabled: bool,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub sentiment_analysis: bool,
    pub key_point_extraction: bool,
    pub dispute_analysis: bool,
    pub explanation_generation: bool,
    pub performance_evaluation: bool,
    pub multilingual_support: bool,
    pub language_detection: bool,
    pub entity_tagging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub classifier: ClassifierInfo,
    pub features: FeatureFlags,
    pub supported_languages: Vec<Language>,
    pub performance_keywords_count: usize,
    pub dispute_keywords_count: usize,
    pub entity_patterns_count: usize,
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
