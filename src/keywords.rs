//! Keyword extraction against the embedded lexicons.
//!
//! Two modes:
//! - performance: token-oriented polarity scan with negative-modifier merging
//! - dispute: phrase containment over the preprocessed text

use serde::{Deserialize, Serialize};

use crate::dispute::DisputeType;
use crate::lexicon::{DISPUTE, PERFORMANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitTag {
    Polarity { polarity: Polarity },
    Dispute { categories: Vec<DisputeType> },
}

/// Half-open range. Token indices for performance hits, byte offsets into
/// the preprocessed text for dispute hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub tag: HitTag,
    pub phrase: String,
    pub span: Span,
}

impl KeywordHit {
    pub fn polarity(&self) -> Option<Polarity> {
        match self.tag {
            HitTag::Polarity { polarity } => Some(polarity),
            HitTag::Dispute { .. } => None,
        }
    }

    fn performance(polarity: Polarity, phrase: String, start: usize, end: usize) -> Self {
        Self {
            tag: HitTag::Polarity { polarity },
            phrase,
            span: Span { start, end },
        }
    }
}

/// Hit counts per polarity bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl PolarityCounts {
    pub fn from_hits(hits: &[KeywordHit]) -> Self {
        let mut counts = Self::default();
        for p in hits.iter().filter_map(KeywordHit::polarity) {
            match p {
                Polarity::Positive => counts.positive += 1,
                Polarity::Negative => counts.negative += 1,
                Polarity::Neutral => counts.neutral += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Performance-mode scan over segmenter tokens.
///
/// A negative modifier immediately followed by a positive phrase yields one
/// merged negative hit covering both tokens. Every token contributes to at
/// most one hit.
pub fn extract_performance(tokens: &[String]) -> Vec<KeywordHit> {
    let lex = &*PERFORMANCE;
    let mut hits = Vec::new();
    let mut consumed = vec![false; tokens.len()];

    for i in 0..tokens.len() {
        if consumed[i] {
            continue;
        }
        let tok = tokens[i].as_str();

        if lex.is_modifier(tok) {
            if let Some(next) = tokens.get(i + 1) {
                if lex.is_positive(next) {
                    consumed[i] = true;
                    consumed[i + 1] = true;
                    hits.push(KeywordHit::performance(
                        Polarity::Negative,
                        format!("{tok} {next}"),
                        i,
                        i + 2,
                    ));
                    continue;
                }
            }
        }

        let polarity = if lex.is_positive(tok) {
            Polarity::Positive
        } else if lex.is_negative(tok) {
            Polarity::Negative
        } else if lex.is_neutral(tok) {
            Polarity::Neutral
        } else {
            continue;
        };
        consumed[i] = true;
        hits.push(KeywordHit::performance(polarity, tok.to_string(), i, i + 1));
    }

    hits
}

/// Dispute-mode scan. Every lexicon phrase contained anywhere in `text`
/// (already preprocessed) is reported once, in lexicon order. Substrings of
/// unrelated words match too.
pub fn extract_dispute(text: &str) -> Vec<KeywordHit> {
    let lex = &*DISPUTE;
    lex.phrases
        .iter()
        .filter_map(|phrase| {
            let start = text.find(phrase.as_str())?;
            Some(KeywordHit {
                tag: HitTag::Dispute {
                    categories: lex.categories_for(phrase).collect(),
                },
                phrase: phrase.clone(),
                span: Span {
                    start,
                    end: start + phrase.len(),
                },
            })
        })
        .collect()
}
