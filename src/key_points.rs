//! Key-point extraction: per-sentence salience ranking.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::keywords::extract_performance;
use crate::language::Language;
use crate::lexicon::KEY_POINTS;
use crate::preprocess::preprocess;
use crate::segment::{EntityTagger, PosTagger, Segmenter};
use crate::sentiment::{DocumentSentiment, Sentiment, SentimentScorer};

pub const MAX_KEY_POINTS: usize = 3;
const HIGH_CONFIDENCE: f32 = 0.8;

static NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid numeral regex"));

/// Raw counts behind a salience score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalienceSignals {
    pub keyword_hits: usize,
    pub numerals: usize,
    pub action_words: usize,
    pub entities: usize,
    pub content_words: usize,
    pub matches_overall: bool,
    pub high_confidence: bool,
    pub metric_terms: usize,
}

impl SalienceSignals {
    pub fn score(&self) -> usize {
        self.keyword_hits * 2
            + self.numerals * 3
            + self.action_words * 2
            + self.entities * 2
            + self.content_words
            + if self.matches_overall { 3 } else { 0 }
            + if self.high_confidence { 2 } else { 0 }
            + self.metric_terms * 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub sentence: String,
    pub score: usize,
    pub signals: SalienceSignals,
}

fn count_contained(haystack: &str, terms: &[String]) -> usize {
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}

/// Signals that do not depend on the sentence's own sentiment.
pub fn lexical_signals(
    sentence: &str,
    lang: Language,
    segmenter: &dyn Segmenter,
    entities: &dyn EntityTagger,
    pos: &dyn PosTagger,
) -> SalienceSignals {
    let normalized = preprocess(sentence);
    let tokens = segmenter.tokens(&normalized, lang);
    SalienceSignals {
        keyword_hits: extract_performance(&tokens).len(),
        numerals: NUMERAL.find_iter(sentence).count(),
        action_words: count_contained(&normalized, &KEY_POINTS.action_words),
        entities: entities.entities(sentence),
        content_words: pos.content_words(sentence, lang),
        matches_overall: false,
        high_confidence: false,
        metric_terms: count_contained(&normalized, &KEY_POINTS.metric_terms),
    }
}

/// Stable descending sort, then the first `MAX_KEY_POINTS` with score > 0.
pub fn select_top(mut scored: Vec<ScoredSentence>) -> Vec<ScoredSentence> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
        .into_iter()
        .filter(|s| s.score > 0)
        .take(MAX_KEY_POINTS)
        .collect()
}

pub struct KeyPointExtractor<'a> {
    pub segmenter: &'a dyn Segmenter,
    pub entities: &'a dyn EntityTagger,
    pub pos: &'a dyn PosTagger,
    pub scorer: &'a SentimentScorer,
}

impl KeyPointExtractor<'_> {
    /// Ranks every sentence of `text` (no length filter) against the
    /// document verdict `overall`.
    pub async fn extract(
        &self,
        text: &str,
        lang: Language,
        overall: Sentiment,
    ) -> Vec<ScoredSentence> {
        let mut scored = Vec::new();
        for sentence in self.segmenter.sentences(text, lang) {
            let own: DocumentSentiment = self.scorer.score_document(&sentence).await;
            let mut signals =
                lexical_signals(&sentence, lang, self.segmenter, self.entities, self.pos);
            signals.matches_overall = own.sentiment == overall;
            signals.high_confidence = own.confidence > HIGH_CONFIDENCE;
            scored.push(ScoredSentence {
                score: signals.score(),
                sentence,
                signals,
            });
        }
        select_top(scored)
    }
}
