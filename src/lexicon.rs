//! Immutable bilingual lexicons, embedded at compile time and parsed once.
//!
//! Nothing here is ever mutated after the first access, so the tables are
//! shared by every request without locking.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

use crate::dispute::DisputeType;
use crate::language::Language;

/// Upper bound on syllables per lexicon phrase considered by the segmenter.
pub const MAX_PHRASE_SYLLABLES: usize = 4;

#[derive(Debug, Deserialize)]
struct PerformanceFile {
    positive: Vec<String>,
    negative: Vec<String>,
    neutral: Vec<String>,
    negative_modifiers: Vec<String>,
    strong_indicators: IndicatorFile,
    stopwords: LanguageTable<Vec<String>>,
    negations: LanguageTable<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct IndicatorFile {
    positive: Vec<String>,
    negative: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DisputeFile {
    phrases: Vec<String>,
    categories: BTreeMap<DisputeType, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct KeyPointFile {
    action_words: Vec<String>,
    metric_terms: Vec<String>,
}

/// Per-language table, resolved once per request by language enum.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageTable<T> {
    pub en: T,
    pub vi: T,
}

impl<T> LanguageTable<T> {
    pub fn get(&self, lang: Language) -> &T {
        match lang {
            Language::En => &self.en,
            Language::Vi => &self.vi,
        }
    }

    fn map<U>(self, f: impl Fn(T) -> U) -> LanguageTable<U> {
        LanguageTable {
            en: f(self.en),
            vi: f(self.vi),
        }
    }
}

#[derive(Debug)]
pub struct PerformanceLexicon {
    pub positive: HashSet<String>,
    pub negative: HashSet<String>,
    pub neutral: HashSet<String>,
    pub negative_modifiers: HashSet<String>,
    pub strong_positive: HashSet<String>,
    pub strong_negative: HashSet<String>,
    pub stopwords: LanguageTable<HashSet<String>>,
    pub negations: LanguageTable<HashSet<String>>,
    /// Multi-syllable entries the segmenter should keep together.
    pub compounds: HashSet<String>,
}

impl PerformanceLexicon {
    pub fn is_positive(&self, phrase: &str) -> bool {
        self.positive.contains(phrase)
    }
    pub fn is_negative(&self, phrase: &str) -> bool {
        self.negative.contains(phrase)
    }
    pub fn is_neutral(&self, phrase: &str) -> bool {
        self.neutral.contains(phrase)
    }
    pub fn is_modifier(&self, token: &str) -> bool {
        self.negative_modifiers.contains(token)
    }
    pub fn is_negation(&self, token: &str, lang: Language) -> bool {
        self.negations.get(lang).contains(token)
    }
    pub fn is_stopword(&self, token: &str, lang: Language) -> bool {
        self.stopwords.get(lang).contains(token)
    }

    /// Number of phrases across the three polarity buckets.
    pub fn polarity_size(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len()
    }
}

#[derive(Debug)]
pub struct DisputeLexicon {
    /// Flat phrase list, in scan order.
    pub phrases: Vec<String>,
    pub categories: BTreeMap<DisputeType, Vec<String>>,
}

impl DisputeLexicon {
    pub fn categories_for<'a>(&'a self, phrase: &'a str) -> impl Iterator<Item = DisputeType> + 'a {
        self.categories
            .iter()
            .filter(move |(_, words)| words.iter().any(|w| w == phrase))
            .map(|(ty, _)| *ty)
    }
}

#[derive(Debug)]
pub struct KeyPointLexicon {
    pub action_words: Vec<String>,
    pub metric_terms: Vec<String>,
}

fn to_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().collect()
}

fn dedup_in_order(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

pub static PERFORMANCE: Lazy<PerformanceLexicon> = Lazy::new(|| {
    let raw = include_str!("../lexicon/performance.json");
    let file: PerformanceFile = serde_json::from_str(raw).expect("valid performance lexicon");

    let compounds = file
        .positive
        .iter()
        .chain(&file.negative)
        .chain(&file.neutral)
        .chain(&file.negative_modifiers)
        .chain(&file.strong_indicators.positive)
        .chain(&file.strong_indicators.negative)
        .filter(|p| p.split_whitespace().count() > 1)
        .cloned()
        .collect();

    PerformanceLexicon {
        positive: to_set(file.positive),
        negative: to_set(file.negative),
        neutral: to_set(file.neutral),
        negative_modifiers: to_set(file.negative_modifiers),
        strong_positive: to_set(file.strong_indicators.positive),
        strong_negative: to_set(file.strong_indicators.negative),
        stopwords: file.stopwords.map(to_set),
        negations: file.negations.map(to_set),
        compounds,
    }
});

pub static DISPUTE: Lazy<DisputeLexicon> = Lazy::new(|| {
    let raw = include_str!("../lexicon/dispute.json");
    let file: DisputeFile = serde_json::from_str(raw).expect("valid dispute lexicon");

    // Category phrases missing from the flat list are appended so every
    // category stays reachable.
    let mut phrases = file.phrases;
    for words in file.categories.values() {
        phrases.extend(words.iter().cloned());
    }

    DisputeLexicon {
        phrases: dedup_in_order(phrases),
        categories: file.categories,
    }
});

pub static KEY_POINTS: Lazy<KeyPointLexicon> = Lazy::new(|| {
    let raw = include_str!("../lexicon/key_points.json");
    let file: KeyPointFile = serde_json::from_str(raw).expect("valid key-point lexicon");
    KeyPointLexicon {
        action_words: dedup_in_order(file.action_words),
        metric_terms: dedup_in_order(file.metric_terms),
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performance_lexicon_loads() {
        assert!(PERFORMANCE.is_positive("chất lượng"));
        assert!(PERFORMANCE.is_negative("kém"));
        assert!(PERFORMANCE.is_neutral("trung bình"));
        assert!(PERFORMANCE.is_modifier("kém"));
        assert!(PERFORMANCE.compounds.contains("không hài lòng"));
        assert!(!PERFORMANCE.compounds.contains("tốt"));
    }

    #[test]
    fn stopwords_and_negations_are_per_language() {
        assert!(PERFORMANCE.is_stopword("của", Language::Vi));
        assert!(!PERFORMANCE.is_stopword("của", Language::En));
        assert!(PERFORMANCE.is_negation("never", Language::En));
        assert!(PERFORMANCE.is_negation("chưa", Language::Vi));
    }

    #[test]
    fn dispute_lexicon_contains_every_category_phrase_once() {
        for words in DISPUTE.categories.values() {
            for w in words {
                assert_eq!(
                    DISPUTE.phrases.iter().filter(|p| *p == w).count(),
                    1,
                    "{w} should appear exactly once"
                );
            }
        }
        assert_eq!(DISPUTE.categories.len(), 4);
    }

    #[test]
    fn categories_for_exact_phrase() {
        let cats: Vec<_> = DISPUTE.categories_for("bất công").collect();
        assert_eq!(cats, vec![DisputeType::UnfairTreatment]);
        assert_eq!(DISPUTE.categories_for("appeal").count(), 0);
    }

    #[test]
    fn key_point_terms_are_deduplicated() {
        let n = KEY_POINTS.action_words.len();
        let unique: HashSet<_> = KEY_POINTS.action_words.iter().collect();
        assert_eq!(n, unique.len());
    }
}
