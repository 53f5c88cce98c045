//! Dispute classification, risk scoring and recommendation.
//!
//! Everything here is a pure function of the keyword hits, the document
//! sentiment and the evidence count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::keywords::{HitTag, KeywordHit};
use crate::sentiment::Sentiment;

const HIGH_RISK_SCORE: u32 = 6;
const MEDIUM_RISK_SCORE: u32 = 3;
const STRONG_NEGATIVE_CONFIDENCE: f32 = 0.75;
const MULTIPLE_KEYWORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    CalculationError,
    UnfairTreatment,
    PerformanceDisagreement,
    PolicyConfusion,
    General,
}

/// Resolution order when several categories share the top score.
pub const TIE_BREAK_ORDER: [DisputeType; 4] = [
    DisputeType::UnfairTreatment,
    DisputeType::CalculationError,
    DisputeType::PolicyConfusion,
    DisputeType::PerformanceDisagreement,
];

impl DisputeType {
    pub fn as_str(self) -> &'static str {
        match self {
            DisputeType::CalculationError => "calculation_error",
            DisputeType::UnfairTreatment => "unfair_treatment",
            DisputeType::PerformanceDisagreement => "performance_disagreement",
            DisputeType::PolicyConfusion => "policy_confusion",
            DisputeType::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_RISK_SCORE {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    SeriousAllegationUnfairness,
    PotentialPayrollError,
    StrongNegativeSentiment,
    MultipleDisputeKeywords,
    EvidenceProvided,
}

impl RiskFactor {
    pub fn points(self) -> u32 {
        match self {
            RiskFactor::SeriousAllegationUnfairness => 4,
            RiskFactor::PotentialPayrollError => 2,
            RiskFactor::StrongNegativeSentiment => 3,
            RiskFactor::MultipleDisputeKeywords => 2,
            RiskFactor::EvidenceProvided => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    EscalateToHrImmediately,
    PrioritizeInvestigation,
    ReviewCalculationData,
    ReviewWithManager,
    Mediate,
    DocumentAndMonitor,
    Maintain,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::EscalateToHrImmediately => "escalate_to_hr_immediately",
            Recommendation::PrioritizeInvestigation => "prioritize_investigation",
            Recommendation::ReviewCalculationData => "review_calculation_data",
            Recommendation::ReviewWithManager => "review_with_manager",
            Recommendation::Mediate => "mediate",
            Recommendation::DocumentAndMonitor => "document_and_monitor",
            Recommendation::Maintain => "maintain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    /// In table order.
    pub factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeVerdict {
    pub dispute_type: DisputeType,
    pub type_scores: BTreeMap<DisputeType, usize>,
    pub risk: RiskAssessment,
    pub recommendation: Recommendation,
    pub reasoning: String,
}

/// Per-category vote counts: each hit adds one to every category listing
/// that exact phrase.
pub fn type_scores(hits: &[KeywordHit]) -> BTreeMap<DisputeType, usize> {
    let mut scores: BTreeMap<DisputeType, usize> =
        TIE_BREAK_ORDER.iter().map(|t| (*t, 0)).collect();
    for hit in hits {
        if let HitTag::Dispute { categories } = &hit.tag {
            for c in categories {
                *scores.entry(*c).or_insert(0) += 1;
            }
        }
    }
    scores
}

/// Highest-scoring category; ties resolved by `TIE_BREAK_ORDER`; `General`
/// when nothing scored.
pub fn classify_dispute(scores: &BTreeMap<DisputeType, usize>) -> DisputeType {
    let mut best = (DisputeType::General, 0usize);
    for ty in TIE_BREAK_ORDER {
        let s = scores.get(&ty).copied().unwrap_or(0);
        if s > best.1 {
            best = (ty, s);
        }
    }
    best.0
}

pub fn assess_risk(
    dispute_type: DisputeType,
    sentiment: Sentiment,
    confidence: f32,
    keyword_count: usize,
    evidence_count: usize,
) -> RiskAssessment {
    let mut factors = Vec::new();
    match dispute_type {
        DisputeType::UnfairTreatment => factors.push(RiskFactor::SeriousAllegationUnfairness),
        DisputeType::CalculationError => factors.push(RiskFactor::PotentialPayrollError),
        _ => {}
    }
    if sentiment == Sentiment::Negative && confidence > STRONG_NEGATIVE_CONFIDENCE {
        factors.push(RiskFactor::StrongNegativeSentiment);
    }
    if keyword_count >= MULTIPLE_KEYWORDS {
        factors.push(RiskFactor::MultipleDisputeKeywords);
    }
    if evidence_count > 0 {
        factors.push(RiskFactor::EvidenceProvided);
    }

    let score = factors.iter().map(|f| f.points()).sum();
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}

/// First matching row wins.
pub fn recommend(
    level: RiskLevel,
    dispute_type: DisputeType,
    sentiment: Sentiment,
) -> Recommendation {
    use DisputeType::*;
    match (level, dispute_type) {
        (RiskLevel::High, UnfairTreatment) => Recommendation::EscalateToHrImmediately,
        (RiskLevel::High, _) => Recommendation::PrioritizeInvestigation,
        (RiskLevel::Medium, CalculationError) => Recommendation::ReviewCalculationData,
        (RiskLevel::Medium, UnfairTreatment) => Recommendation::ReviewWithManager,
        (RiskLevel::Medium, _) => Recommendation::Mediate,
        (RiskLevel::Low, _) if sentiment == Sentiment::Negative => {
            Recommendation::DocumentAndMonitor
        }
        (RiskLevel::Low, _) => Recommendation::Maintain,
    }
}

/// Audit text; not used for control flow.
pub fn reasoning(
    dispute_type: DisputeType,
    level: RiskLevel,
    sentiment: Sentiment,
    confidence: f32,
    keyword_count: usize,
    recommendation: Recommendation,
) -> String {
    format!(
        "Dispute identified as '{}' with '{}' risk. Sentiment was '{}' (confidence: {:.2}). Found {} relevant keywords. Recommendation is to '{}'.",
        dispute_type.as_str(),
        level.as_str(),
        sentiment,
        confidence,
        keyword_count,
        recommendation.as_str()
    )
}

pub fn evaluate(
    hits: &[KeywordHit],
    sentiment: Sentiment,
    confidence: f32,
    evidence_count: usize,
) -> DisputeVerdict {
    let type_scores = type_scores(hits);
    let dispute_type = classify_dispute(&type_scores);
    let risk = assess_risk(dispute_type, sentiment, confidence, hits.len(), evidence_count);
    let recommendation = recommend(risk.level, dispute_type, sentiment);
    let reasoning = reasoning(
        dispute_type,
        risk.level,
        sentiment,
        confidence,
        hits.len(),
        recommendation,
    );
    DisputeVerdict {
        dispute_type,
        type_scores,
        risk,
        recommendation,
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::extract_dispute;

    #[test]
    fn tie_between_unfair_and_calculation_prefers_unfair() {
        let hits = extract_dispute("unfair and wrong");
        let scores = type_scores(&hits);
        assert_eq!(scores[&DisputeType::UnfairTreatment], 1);
        assert_eq!(scores[&DisputeType::CalculationError], 1);
        assert_eq!(classify_dispute(&scores), DisputeType::UnfairTreatment);
    }

    #[test]
    fn policy_beats_performance_on_tie() {
        let hits = extract_dispute("policy about performance");
        assert_eq!(classify_dispute(&type_scores(&hits)), DisputeType::PolicyConfusion);
    }

    #[test]
    fn highest_score_wins_over_priority() {
        let hits = extract_dispute("unfair wrong error mistake");
        assert_eq!(classify_dispute(&type_scores(&hits)), DisputeType::CalculationError);
    }

    #[test]
    fn no_category_hits_is_general() {
        let hits = extract_dispute("i want to appeal");
        assert_eq!(hits.len(), 1);
        assert_eq!(classify_dispute(&type_scores(&hits)), DisputeType::General);
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(6), RiskLevel::High);
    }

    #[test]
    fn full_risk_scenario_escalates() {
        let risk = assess_risk(DisputeType::UnfairTreatment, Sentiment::Negative, 0.8, 3, 1);
        assert_eq!(risk.score, 10);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(
            risk.factors,
            vec![
                RiskFactor::SeriousAllegationUnfairness,
                RiskFactor::StrongNegativeSentiment,
                RiskFactor::MultipleDisputeKeywords,
                RiskFactor::EvidenceProvided,
            ]
        );
        assert_eq!(
            recommend(risk.level, DisputeType::UnfairTreatment, Sentiment::Negative),
            Recommendation::EscalateToHrImmediately
        );
    }

    #[test]
    fn strong_negative_needs_confidence_above_threshold() {
        let at = assess_risk(DisputeType::General, Sentiment::Negative, 0.75, 0, 0);
        assert!(at.factors.is_empty());
    }

    #[test]
    fn recommendation_table() {
        use DisputeType::*;
        let r = |l, t, s| recommend(l, t, s);
        assert_eq!(
            r(RiskLevel::High, General, Sentiment::Neutral),
            Recommendation::PrioritizeInvestigation
        );
        assert_eq!(
            r(RiskLevel::Medium, CalculationError, Sentiment::Neutral),
            Recommendation::ReviewCalculationData
        );
        assert_eq!(
            r(RiskLevel::Medium, UnfairTreatment, Sentiment::Neutral),
            Recommendation::ReviewWithManager
        );
        assert_eq!(
            r(RiskLevel::Medium, PolicyConfusion, Sentiment::Negative),
            Recommendation::Mediate
        );
        assert_eq!(
            r(RiskLevel::Low, General, Sentiment::Negative),
            Recommendation::DocumentAndMonitor
        );
        assert_eq!(
            r(RiskLevel::Low, General, Sentiment::Positive),
            Recommendation::Maintain
        );
    }

    #[test]
    fn reasoning_mentions_everything() {
        let text = reasoning(
            DisputeType::CalculationError,
            RiskLevel::Medium,
            Sentiment::Negative,
            0.666,
            2,
            Recommendation::ReviewCalculationData,
        );
        assert_eq!(
            text,
            "Dispute identified as 'calculation_error' with 'medium' risk. Sentiment was 'negative' (confidence: 0.67). Found 2 relevant keywords. Recommendation is to 'review_calculation_data'."
        );
    }

    #[test]
    fn type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DisputeType::PolicyConfusion).unwrap(),
            "\"policy_confusion\""
        );
    }
}
