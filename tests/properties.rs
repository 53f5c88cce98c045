// tests/properties.rs
//
// Property tests for the pure scoring pieces.

use proptest::prelude::*;

use reward_nlp_engine::dispute::RiskLevel;
use reward_nlp_engine::language::vietnamese_ratio;
use reward_nlp_engine::satisfaction::{satisfaction_score, FeedbackSource};
use reward_nlp_engine::sentiment::{aggregate, rule_score_tokens};
use reward_nlp_engine::{
    detect_language, preprocess, Language, Provenance, SentenceVerdict, Sentiment,
};

const VOCAB: &[&str] = &[
    "excellent", "good", "great", "poor", "bad", "not", "very", "quality", "average",
    "work", "the", "team", "kém", "tốt", "không", "chất lượng", "hiệu quả", "rất",
    "nhân viên", "12", "q3",
];

fn sentiment() -> impl Strategy<Value = Sentiment> {
    prop_oneof![
        Just(Sentiment::Positive),
        Just(Sentiment::Negative),
        Just(Sentiment::Neutral),
    ]
}

fn source() -> impl Strategy<Value = FeedbackSource> {
    prop_oneof![
        Just(FeedbackSource::Client),
        Just(FeedbackSource::Manager),
        Just(FeedbackSource::Peer),
        Just(FeedbackSource::SelfReview),
        Just(FeedbackSource::Other),
    ]
}

fn verdict() -> impl Strategy<Value = SentenceVerdict> {
    (sentiment(), 0.0f32..=1.0).prop_map(|(sentiment, confidence)| SentenceVerdict {
        sentence: "sentence".to_string(),
        sentiment,
        confidence,
        provenance: Provenance::External,
    })
}

proptest! {
    #[test]
    fn preprocess_is_idempotent(s in "[a-zA-Z0-9àáảãạâầấậăằắđèéêếềệìíòóôốồơờớùúưừứỳý .,!?\t-]{0,60}") {
        let once = preprocess(&s);
        prop_assert_eq!(preprocess(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn detection_is_deterministic(s in "\\PC{0,80}") {
        prop_assert_eq!(detect_language(&s), detect_language(&s));
        let r = vietnamese_ratio(&s);
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn rule_score_is_bounded(
        idx in prop::collection::vec(0..VOCAB.len(), 0..12),
        vi in any::<bool>(),
    ) {
        let tokens: Vec<String> = idx.iter().map(|i| VOCAB[*i].to_string()).collect();
        let lang = if vi { Language::Vi } else { Language::En };
        let score = rule_score_tokens(&tokens, lang);
        prop_assert!((0.0..=1.0).contains(&score.confidence));
        prop_assert!((-1.0..=1.0).contains(&score.combined));
    }

    #[test]
    fn any_negative_sentence_wins(verdicts in prop::collection::vec(verdict(), 0..8)) {
        let (overall, confidence) = aggregate(&verdicts);
        prop_assert!((0.0..=1.0).contains(&confidence));
        let has_negative = verdicts.iter().any(|v| v.sentiment == Sentiment::Negative);
        prop_assert_eq!(overall == Sentiment::Negative, has_negative);
        if verdicts.is_empty() {
            prop_assert_eq!(overall, Sentiment::Neutral);
        }
    }

    #[test]
    fn satisfaction_stays_in_range(
        s in sentiment(),
        confidence in -5.0f32..5.0,
        src in source(),
    ) {
        let out = satisfaction_score(s, confidence, src);
        prop_assert!((1.0..=10.0).contains(&out.score));
    }

    #[test]
    fn risk_level_is_monotone(a in 0u32..20, b in 0u32..20) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RiskLevel::from_score(lo) <= RiskLevel::from_score(hi));
    }
}
