//! Feedback and dispute pipelines.
//!
//! `Engine` owns the collaborators (segmenter, classifier, taggers) and is
//! shared read-only across requests behind an `Arc`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::classifier::{build_classifier, DisabledClassifier, DynClassifier};
use crate::config::classifier::DEFAULT_TIMEOUT_MS;
use crate::config::ClassifierConfig;
use crate::dispute;
use crate::entities::RegexEntityTagger;
use crate::error::{EngineError, EngineResult};
use crate::explanation::{explain_commission, CommissionSummary};
use crate::key_points::KeyPointExtractor;
use crate::keywords::extract_dispute;
use crate::language::{detect_language, Language};
use crate::lexicon::{DISPUTE, PERFORMANCE};
use crate::metrics;
use crate::performance::{
    combine, sentiment_points, KpiScores, QualitativeAssessment, QuantitativeAssessment,
    SentimentDistribution,
};
use crate::preprocess::preprocess;
use crate::recommend::{feedback_recommendations, performance_recommendations};
use crate::report::{
    now_rfc3339, ClassifierInfo, DisputeAnalysis, FeatureFlags, FeedbackAnalysis,
    FeedbackExplainability, IndicatorBalance, ModelInfo, PerformanceEvaluation,
};
use crate::satisfaction::{satisfaction_score, FeedbackSource};
use crate::segment::{DynEntityTagger, DynPosTagger, DynSegmenter, NoTagger, UnicodeSegmenter};
use crate::sentiment::SentimentScorer;
use crate::telemetry::anon_hash;

fn default_source() -> String {
    "peer".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

impl FeedbackRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            context: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisputeRequest {
    pub commission_id: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_source")]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRequest {
    pub employee_id: String,
    pub role: String,
    #[serde(default, alias = "kpi_data")]
    pub kpi: KpiScores,
    #[serde(default, alias = "feedback_texts")]
    pub feedback: Vec<FeedbackItem>,
}

pub struct Engine {
    segmenter: DynSegmenter,
    entities: DynEntityTagger,
    pos: DynPosTagger,
    scorer: SentimentScorer,
    timeout: Duration,
    entity_patterns: usize,
}

pub struct EngineBuilder {
    segmenter: DynSegmenter,
    classifier: DynClassifier,
    entities: DynEntityTagger,
    pos: DynPosTagger,
    timeout: Duration,
    entity_patterns: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            segmenter: Arc::new(UnicodeSegmenter),
            classifier: Arc::new(DisabledClassifier),
            entities: Arc::new(NoTagger),
            pos: Arc::new(NoTagger),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            entity_patterns: 0,
        }
    }
}

impl EngineBuilder {
    pub fn segmenter(mut self, segmenter: DynSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn classifier(mut self, classifier: DynClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn entity_tagger(mut self, entities: DynEntityTagger) -> Self {
        self.entities = entities;
        self
    }

    pub fn regex_entities(mut self, tagger: RegexEntityTagger) -> Self {
        self.entity_patterns = tagger.len();
        self.entities = Arc::new(tagger);
        self
    }

    pub fn pos_tagger(mut self, pos: DynPosTagger) -> Self {
        self.pos = pos;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            scorer: SentimentScorer::new(self.segmenter.clone(), self.classifier, self.timeout),
            segmenter: self.segmenter,
            entities: self.entities,
            pos: self.pos,
            timeout: self.timeout,
            entity_patterns: self.entity_patterns,
        }
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Rule-based only, no taggers.
    pub fn rule_based() -> Self {
        Self::builder().build()
    }

    /// Classifier from `config/classifier.{toml,json}` (or
    /// `CLASSIFIER_CONFIG_PATH`), entity patterns from `config/entities/`.
    /// Bad configuration degrades to the rule-based classifier.
    pub fn from_env() -> Self {
        let cfg = ClassifierConfig::load_default().unwrap_or_else(|error| {
            warn!(
                target: "pipeline",
                error = %format!("{error:#}"),
                "classifier config invalid; rule-based only"
            );
            ClassifierConfig::default()
        });
        let classifier = build_classifier(&cfg);
        info!(
            target: "pipeline",
            provider = classifier.provider_name(),
            enabled = classifier.is_enabled(),
            timeout_ms = cfg.timeout_ms,
            "engine configured"
        );
        Self::builder()
            .classifier(classifier)
            .classifier_timeout(cfg.timeout())
            .regex_entities(RegexEntityTagger::from_env())
            .build()
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    fn key_points(&self) -> KeyPointExtractor<'_> {
        KeyPointExtractor {
            segmenter: self.segmenter.as_ref(),
            entities: self.entities.as_ref(),
            pos: self.pos.as_ref(),
            scorer: &self.scorer,
        }
    }

    /// Empty text is not an error: it yields the neutral default verdict.
    pub async fn process_feedback(&self, req: &FeedbackRequest) -> EngineResult<FeedbackAnalysis> {
        let text = req.text.as_str();
        let language = detect_language(text);
        let processed = preprocess(text);
        let doc = self.scorer.score_document(&processed).await;
        let overall_rule = self.scorer.rule_score(&processed);

        // key points rank the sentences of the raw text
        let scored = self.key_points().extract(text, language, doc.sentiment).await;
        let key_point_signals = scored.iter().map(|s| s.signals).collect();
        let key_points: Vec<String> = scored.into_iter().map(|s| s.sentence).collect();

        let source = FeedbackSource::parse(&req.source);
        let satisfaction = satisfaction_score(doc.sentiment, doc.confidence, source);
        let recommendations = feedback_recommendations(doc.sentiment, &key_points, &req.source);

        info!(
            target: "pipeline",
            id = %anon_hash(text),
            %language,
            sentiment = %doc.sentiment,
            confidence = doc.confidence,
            key_points = key_points.len(),
            model_used = ?doc.model_used,
            "feedback processed"
        );
        metrics::record_feedback(language);

        Ok(FeedbackAnalysis {
            sentiment: doc.sentiment,
            confidence: doc.confidence,
            language,
            satisfaction_score: satisfaction.score,
            explainability: FeedbackExplainability {
                language_detected: language,
                keyword_balance: overall_rule.keywords,
                indicator_balance: IndicatorBalance {
                    positive: overall_rule.indicator_positive,
                    negative: overall_rule.indicator_negative,
                    eligible_tokens: overall_rule.eligible_tokens,
                },
                model_used: doc.model_used,
                source_weight: satisfaction.source_weight,
                key_points_reasoning: format!(
                    "Extracted {} key points based on performance keywords, context, and quantitative data",
                    key_points.len()
                ),
                key_point_signals,
                satisfaction_calculation: format!(
                    "Base score 5.0 adjusted by sentiment ({}) and confidence {:.2}; source weight {:.2} reported only",
                    doc.sentiment, doc.confidence, satisfaction.source_weight
                ),
                recommendation_basis: format!(
                    "Based on {} sentiment with {:.2} confidence",
                    doc.sentiment, doc.confidence
                ),
            },
            key_points,
            recommendations,
            sentences: doc.sentences,
            source: req.source.clone(),
            context: req.context.clone(),
            processed_at: now_rfc3339(),
        })
    }

    pub async fn analyze_dispute(&self, req: &DisputeRequest) -> EngineResult<DisputeAnalysis> {
        if req.commission_id.trim().is_empty() {
            return Err(EngineError::invalid("commission_id", "must not be blank"));
        }

        let language = detect_language(&req.reason);
        let processed = preprocess(&req.reason);
        let doc = self.scorer.score_document(&processed).await;
        let hits = extract_dispute(&processed);
        let verdict = dispute::evaluate(&hits, doc.sentiment, doc.confidence, req.evidence.len());

        info!(
            target: "pipeline",
            commission_id = %req.commission_id,
            id = %anon_hash(&req.reason),
            %language,
            dispute_type = verdict.dispute_type.as_str(),
            risk_score = verdict.risk.score,
            risk_level = verdict.risk.level.as_str(),
            "dispute analyzed"
        );
        metrics::record_dispute(verdict.risk.level);

        Ok(DisputeAnalysis {
            sentiment: doc.sentiment,
            confidence: doc.confidence,
            language,
            dispute_type: verdict.dispute_type,
            dispute_keywords: hits.into_iter().map(|h| h.phrase).collect(),
            recommendation: verdict.recommendation,
            suggested_adjustment: 0,
            reasoning: verdict.reasoning,
            risk_level: verdict.risk.level,
            risk_score: verdict.risk.score,
            risk_factors: verdict.risk.factors,
            evidence_count: req.evidence.len(),
            commission_id: req.commission_id.clone(),
            employee_id: req.employee_id.clone(),
            processed_at: now_rfc3339(),
        })
    }

    pub async fn evaluate_performance(
        &self,
        req: &PerformanceRequest,
    ) -> EngineResult<PerformanceEvaluation> {
        if req.employee_id.trim().is_empty() {
            return Err(EngineError::invalid("employee_id", "must not be blank"));
        }

        let mut distribution = SentimentDistribution::default();
        let mut key_points = Vec::new();
        let mut weighted = Vec::new();

        for item in req.feedback.iter().filter(|f| !f.text.trim().is_empty()) {
            let analysis = self
                .process_feedback(&FeedbackRequest::new(item.text.clone(), item.source.clone()))
                .await?;
            distribution.record(analysis.sentiment);
            let weight = FeedbackSource::parse(&item.source).evaluation_weight();
            weighted.push(sentiment_points(analysis.sentiment, analysis.confidence) * weight);
            key_points.extend(analysis.key_points);
        }

        let qualitative = if weighted.is_empty() {
            0.0
        } else {
            weighted.iter().sum::<f32>() / weighted.len() as f32
        };
        let quantitative = req.kpi.average();
        let combined = combine(quantitative, qualitative, &req.role);

        info!(
            target: "pipeline",
            employee_id = %req.employee_id,
            role = %req.role,
            feedback = weighted.len(),
            combined_score = combined.combined_score,
            "performance evaluated"
        );

        Ok(PerformanceEvaluation {
            employee_id: req.employee_id.clone(),
            role: req.role.clone(),
            quantitative_assessment: QuantitativeAssessment {
                scores: req.kpi,
                average_score: quantitative,
            },
            qualitative_assessment: QualitativeAssessment {
                feedback_count: weighted.len(),
                sentiment_distribution: distribution,
                key_points,
                average_score: qualitative,
            },
            recommendations: performance_recommendations(combined.performance_level, &req.role),
            combined_assessment: combined,
            processed_at: now_rfc3339(),
        })
    }

    pub fn explain_commission(&self, summary: &CommissionSummary) -> String {
        explain_commission(summary)
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_type: "hybrid_classifier_rule_based".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            classifier: ClassifierInfo {
                provider: self.scorer.classifier_name().to_string(),
                enabled: self.scorer.classifier_enabled(),
                timeout_ms: self.timeout.as_millis() as u64,
            },
            features: FeatureFlags {
                sentiment_analysis: true,
                key_point_extraction: true,
                dispute_analysis: true,
                explanation_generation: true,
                performance_evaluation: true,
                multilingual_support: true,
                language_detection: true,
                entity_tagging: self.entity_patterns > 0,
            },
            supported_languages: Language::ALL.to_vec(),
            performance_keywords_count: PERFORMANCE.polarity_size(),
            dispute_keywords_count: DISPUTE.phrases.len(),
            entity_patterns_count: self.entity_patterns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispute::{DisputeType, RiskLevel};
    use crate::sentiment::Sentiment;

    #[tokio::test]
    async fn empty_feedback_is_neutral_default() {
        let out = Engine::rule_based()
            .process_feedback(&FeedbackRequest::new("", "client"))
            .await
            .unwrap();
        assert_eq!(out.sentiment, Sentiment::Neutral);
        assert_eq!(out.confidence, 1.0);
        assert_eq!(out.satisfaction_score, 5.0);
        assert!(out.key_points.is_empty());
        assert_eq!(out.language, Language::En);
    }

    #[tokio::test]
    async fn blank_commission_id_is_invalid() {
        let err = Engine::rule_based()
            .analyze_dispute(&DisputeRequest {
                commission_id: "  ".into(),
                reason: "wrong amount".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { field: "commission_id", .. }));
    }

    #[tokio::test]
    async fn empty_reason_is_general_low_maintain() {
        let out = Engine::rule_based()
            .analyze_dispute(&DisputeRequest {
                commission_id: "C-1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out.dispute_type, DisputeType::General);
        assert_eq!(out.risk_level, RiskLevel::Low);
        assert_eq!(out.risk_score, 0);
        assert_eq!(out.suggested_adjustment, 0);
    }

    #[test]
    fn model_info_reports_rule_based() {
        let info = Engine::rule_based().model_info();
        assert_eq!(info.classifier.provider, "disabled");
        assert!(!info.classifier.enabled);
        assert_eq!(info.supported_languages, vec![Language::En, Language::Vi]);
        assert!(info.dispute_keywords_count > 40);
        assert!(!info.features.entity_tagging);
    }

    #[test]
    fn feedback_request_defaults_source() {
        let r: FeedbackRequest = serde_json::from_str(r#"{ "text": "ok" }"#).unwrap();
        assert_eq!(r.source, "peer");
    }
}
