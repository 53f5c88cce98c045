//! Hybrid sentiment scoring: external classifier per sentence with a
//! rule-based substitute, aggregated into one document verdict.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::classifier::{DynClassifier, StarRating};
use crate::error::ClassifierError;
use crate::keywords::{extract_performance, PolarityCounts};
use crate::language::{detect_language, Language};
use crate::lexicon::PERFORMANCE;
use crate::metrics;
use crate::preprocess::preprocess;
use crate::segment::DynSegmenter;

/// Sentences shorter than this (trimmed, in chars) are ignored by aggregation.
pub const MIN_SENTENCE_CHARS: usize = 5;

const POLARITY_THRESHOLD: f32 = 0.1;
const RULE_MAX_CONFIDENCE: f32 = 0.95;
const RULE_NEUTRAL_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced a sentence verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    External,
    RuleBased,
}

/// Summary of which paths contributed to a document verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelUsed {
    External,
    RuleBased,
    Mixed,
    None,
}

/// Rule-based score of one sentence with the counts that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub combined: f32,
    pub keywords: PolarityCounts,
    pub indicator_positive: usize,
    pub indicator_negative: usize,
    pub eligible_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceVerdict {
    pub sentence: String,
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub provenance: Provenance,
}

impl SentenceVerdict {
    pub fn external(sentence: &str, rating: StarRating) -> Self {
        Self {
            sentence: sentence.to_string(),
            sentiment: rating.sentiment(),
            confidence: rating.confidence(),
            provenance: Provenance::External,
        }
    }

    pub fn rule_based(sentence: &str, score: &RuleScore) -> Self {
        Self {
            sentence: sentence.to_string(),
            sentiment: score.sentiment,
            confidence: score.confidence,
            provenance: Provenance::RuleBased,
        }
    }

    /// The classifier outcome when it succeeded, otherwise the fallback.
    pub fn external_or_else<F>(
        sentence: &str,
        outcome: Result<StarRating, ClassifierError>,
        fallback: F,
    ) -> Self
    where
        F: FnOnce() -> Self,
    {
        match outcome {
            Ok(rating) => Self::external(sentence, rating),
            Err(_) => fallback(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    pub sentiment: Sentiment,
    /// Rounded to 2 decimals.
    pub confidence: f32,
    pub model_used: ModelUsed,
    pub sentences: Vec<SentenceVerdict>,
}

impl DocumentSentiment {
    pub fn neutral_default() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: 1.0,
            model_used: ModelUsed::None,
            sentences: Vec::new(),
        }
    }
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}

/// Combine sentence verdicts; any negative sentence wins.
///
/// 1. any negative: negative, mean confidence of negative sentences
/// 2. any positive: positive, mean confidence of non-negative sentences
/// 3. otherwise neutral, mean confidence of all sentences
///
/// No sentences: neutral with confidence 1.0.
pub fn aggregate(verdicts: &[SentenceVerdict]) -> (Sentiment, f32) {
    if verdicts.is_empty() {
        return (Sentiment::Neutral, 1.0);
    }
    let has = |s: Sentiment| verdicts.iter().any(|v| v.sentiment == s);

    let (sentiment, confidence) = if has(Sentiment::Negative) {
        let c = mean(
            verdicts
                .iter()
                .filter(|v| v.sentiment == Sentiment::Negative)
                .map(|v| v.confidence),
        );
        (Sentiment::Negative, c)
    } else if has(Sentiment::Positive) {
        // no negatives here, so "non-negative" is every sentence
        (Sentiment::Positive, mean(verdicts.iter().map(|v| v.confidence)))
    } else {
        (Sentiment::Neutral, mean(verdicts.iter().map(|v| v.confidence)))
    };

    (sentiment, confidence.clamp(0.0, 1.0))
}

fn model_used(verdicts: &[SentenceVerdict]) -> ModelUsed {
    let external = verdicts
        .iter()
        .filter(|v| v.provenance == Provenance::External)
        .count();
    match (external, verdicts.len() - external) {
        (0, 0) => ModelUsed::None,
        (_, 0) => ModelUsed::External,
        (0, _) => ModelUsed::RuleBased,
        _ => ModelUsed::Mixed,
    }
}

fn is_alphabetic_token(token: &str) -> bool {
    let mut letters = token.chars().filter(|c| !c.is_whitespace()).peekable();
    letters.peek().is_some() && letters.all(char::is_alphabetic)
}

pub struct SentimentScorer {
    segmenter: DynSegmenter,
    classifier: DynClassifier,
    timeout: Duration,
}

impl SentimentScorer {
    pub fn new(segmenter: DynSegmenter, classifier: DynClassifier, timeout: Duration) -> Self {
        Self {
            segmenter,
            classifier,
            timeout,
        }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.provider_name()
    }

    pub fn classifier_enabled(&self) -> bool {
        self.classifier.is_enabled()
    }

    /// Rule-based score of a single sentence.
    ///
    /// Average of the keyword balance (positive minus negative over all
    /// performance hits) and the strong-indicator balance over eligible
    /// tokens (alphabetic, not a stopword). Negation words are eligible but
    /// never count as indicators.
    pub fn rule_score(&self, sentence: &str) -> RuleScore {
        let lang = detect_language(sentence);
        let tokens = self.segmenter.tokens(&preprocess(sentence), lang);
        rule_score_tokens(&tokens, lang)
    }

    async fn classify_bounded(&self, sentence: &str) -> Result<StarRating, ClassifierError> {
        match tokio::time::timeout(self.timeout, self.classifier.classify(sentence)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClassifierError::Timeout(self.timeout)),
        }
    }

    /// Verdict for one sentence. Classifier failures are absorbed here.
    pub async fn score_sentence(&self, index: usize, sentence: &str) -> SentenceVerdict {
        let rule = || SentenceVerdict::rule_based(sentence, &self.rule_score(sentence));
        if !self.classifier.is_enabled() {
            return rule();
        }

        let outcome = self.classify_bounded(sentence).await;
        if let Err(e) = &outcome {
            match e {
                ClassifierError::Unavailable => {
                    debug!(
                        target: "classifier",
                        sentence = index,
                        "classifier unavailable; rule-based"
                    )
                }
                other => warn!(
                    target: "classifier",
                    sentence = index,
                    kind = other.kind(),
                    error = %other,
                    "classifier failed; rule-based substitute"
                ),
            }
            metrics::record_classifier_fallback(e.kind());
        }
        SentenceVerdict::external_or_else(sentence, outcome, rule)
    }

    /// Sentence-level verdicts aggregated into one document verdict.
    pub async fn score_document(&self, text: &str) -> DocumentSentiment {
        let lang = detect_language(text);
        let sentences: Vec<String> = self
            .segmenter
            .sentences(text, lang)
            .into_iter()
            .filter(|s| s.trim().chars().count() >= MIN_SENTENCE_CHARS)
            .collect();

        if sentences.is_empty() {
            return DocumentSentiment::neutral_default();
        }

        let mut verdicts = Vec::with_capacity(sentences.len());
        for (i, s) in sentences.iter().enumerate() {
            verdicts.push(self.score_sentence(i, s).await);
        }

        let (sentiment, confidence) = aggregate(&verdicts);
        DocumentSentiment {
            sentiment,
            confidence: round_to(confidence, 2),
            model_used: model_used(&verdicts),
            sentences: verdicts,
        }
    }
}

pub fn rule_score_tokens(tokens: &[String], lang: Language) -> RuleScore {
    let lex = &*PERFORMANCE;
    let hits = extract_performance(tokens);
    let keywords = PolarityCounts::from_hits(&hits);

    let eligible: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| is_alphabetic_token(t))
        .filter(|t| !lex.is_stopword(t, lang))
        .collect();
    // negation words count toward the denominator but never as indicators
    let indicators = || eligible.iter().filter(move |t| !lex.is_negation(t, lang));
    let indicator_positive = indicators()
        .filter(|t| lex.strong_positive.contains(**t))
        .count();
    let indicator_negative = indicators()
        .filter(|t| lex.strong_negative.contains(**t))
        .count();

    let keyword_score =
        (keywords.positive as f32 - keywords.negative as f32) / keywords.total().max(1) as f32;
    let indicator_score = (indicator_positive as f32 - indicator_negative as f32)
        / eligible.len().max(1) as f32;
    let combined = (keyword_score + indicator_score) / 2.0;

    let (sentiment, confidence) = if combined > POLARITY_THRESHOLD {
        (Sentiment::Positive, (combined.abs() + 0.5).min(RULE_MAX_CONFIDENCE))
    } else if combined < -POLARITY_THRESHOLD {
        (Sentiment::Negative, (combined.abs() + 0.5).min(RULE_MAX_CONFIDENCE))
    } else {
        (Sentiment::Neutral, RULE_NEUTRAL_CONFIDENCE)
    };

    RuleScore {
        sentiment,
        confidence,
        combined,
        keywords,
        indicator_positive,
        indicator_negative,
        eligible_tokens: eligible.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{DisabledClassifier, FixedClassifier};
    use crate::segment::UnicodeSegmenter;
    use std::sync::Arc;

    fn verdict(s: Sentiment, c: f32) -> SentenceVerdict {
        SentenceVerdict {
            sentence: String::new(),
            sentiment: s,
            confidence: c,
            provenance: Provenance::RuleBased,
        }
    }

    fn rule_only() -> SentimentScorer {
        SentimentScorer::new(
            Arc::new(UnicodeSegmenter),
            Arc::new(DisabledClassifier),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn negative_sentence_dominates() {
        let v = vec![
            verdict(Sentiment::Positive, 0.9),
            verdict(Sentiment::Negative, 0.7),
            verdict(Sentiment::Negative, 0.9),
        ];
        let (s, c) = aggregate(&v);
        assert_eq!(s, Sentiment::Negative);
        assert!((c - 0.8).abs() < 1e-6);
    }

    #[test]
    fn positive_uses_all_non_negative_sentences() {
        let v = vec![
            verdict(Sentiment::Positive, 0.9),
            verdict(Sentiment::Neutral, 0.5),
        ];
        let (s, c) = aggregate(&v);
        assert_eq!(s, Sentiment::Positive);
        assert!((c - 0.7).abs() < 1e-6);
    }

    #[test]
    fn neutral_and_empty() {
        let (s, c) = aggregate(&[verdict(Sentiment::Neutral, 0.5)]);
        assert_eq!((s, c), (Sentiment::Neutral, 0.5));
        assert_eq!(aggregate(&[]), (Sentiment::Neutral, 1.0));
    }

    #[test]
    fn rule_score_positive_english() {
        let r = rule_only().rule_score("Excellent work, great results!");
        assert_eq!(r.sentiment, Sentiment::Positive);
        assert!(r.confidence > 0.5 && r.confidence <= 0.95);
        assert_eq!(r.indicator_positive, 2);
    }

    #[test]
    fn rule_score_negated_vietnamese() {
        let r = rule_only().rule_score("Sản phẩm kém chất lượng");
        assert_eq!(r.keywords.negative, 1);
        assert_eq!(r.keywords.positive, 0);
        assert_eq!(r.sentiment, Sentiment::Negative);
    }

    #[test]
    fn negated_praise_is_negative() {
        let r = rule_only().rule_score("không tốt");
        assert_eq!(r.keywords.negative, 1);
        // "không" stays in the denominator
        assert_eq!(r.eligible_tokens, 2);
        assert_eq!(r.indicator_positive, 1);
        assert!((r.combined + 0.25).abs() < 1e-6);
        assert_eq!(r.sentiment, Sentiment::Negative);
    }

    #[test]
    fn rule_score_without_signal_is_neutral() {
        let r = rule_only().rule_score("The meeting is on Tuesday");
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn external_or_else_prefers_classifier() {
        let rating = StarRating::new(5, 0.8).unwrap();
        let v = SentenceVerdict::external_or_else("s", Ok(rating), || unreachable!());
        assert_eq!(v.provenance, Provenance::External);
        assert_eq!(v.sentiment, Sentiment::Positive);

        let v = SentenceVerdict::external_or_else("s", Err(ClassifierError::EmptyResult), || {
            verdict(Sentiment::Neutral, 0.5)
        });
        assert_eq!(v.provenance, Provenance::RuleBased);
    }

    #[tokio::test]
    async fn short_sentences_are_skipped() {
        let doc = rule_only().score_document("Ok. Yes.").await;
        assert_eq!(doc, DocumentSentiment::neutral_default());
    }

    #[tokio::test]
    async fn document_records_model_used() {
        let scorer = SentimentScorer::new(
            Arc::new(UnicodeSegmenter),
            Arc::new(FixedClassifier::new(StarRating::new(4, 0.876).unwrap())),
            Duration::from_millis(100),
        );
        let doc = scorer.score_document("Great job on the launch. Keep going.").await;
        assert_eq!(doc.model_used, ModelUsed::External);
        assert_eq!(doc.sentiment, Sentiment::Positive);
        assert_eq!(doc.confidence, 0.88);

        let doc = rule_only().score_document("Great job on the launch.").await;
        assert_eq!(doc.model_used, ModelUsed::RuleBased);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.876, 2), 0.88);
        assert_eq!(round_to(7.25, 1), 7.3);
    }
}
