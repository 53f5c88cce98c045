//! Linguistic collaborators: sentence/word segmentation, entity and POS tagging.
//!
//! The pipeline only depends on the traits; `UnicodeSegmenter` is the built-in
//! backend and tests swap in scripted ones.

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::language::Language;
use crate::lexicon::{MAX_PHRASE_SYLLABLES, PERFORMANCE};

pub trait Segmenter: Send + Sync {
    /// Ordered sentences. Total: text without sentences yields an empty vec.
    fn sentences(&self, text: &str, lang: Language) -> Vec<String>;
    /// Word tokens of already preprocessed text.
    fn tokens(&self, text: &str, lang: Language) -> Vec<String>;
}

pub trait EntityTagger: Send + Sync {
    /// Number of named entities found in `sentence`.
    fn entities(&self, sentence: &str) -> usize;
}

pub trait PosTagger: Send + Sync {
    /// Number of alphabetic tokens tagged verb or noun.
    fn content_words(&self, sentence: &str, lang: Language) -> usize;
}

pub type DynSegmenter = Arc<dyn Segmenter>;
pub type DynEntityTagger = Arc<dyn EntityTagger>;
pub type DynPosTagger = Arc<dyn PosTagger>;

/// UAX #29 sentence boundaries plus lexicon-driven syllable merging.
///
/// Vietnamese words are written as space-separated syllables, so plain
/// whitespace splitting would break "chất lượng" in two. Tokens are built by
/// greedily taking the longest run of syllables (up to
/// `MAX_PHRASE_SYLLABLES`) that forms a known lexicon phrase.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn sentences(&self, text: &str, _lang: Language) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn tokens(&self, text: &str, _lang: Language) -> Vec<String> {
        let syllables: Vec<&str> = text.split_whitespace().collect();
        let compounds = &PERFORMANCE.compounds;
        let mut out = Vec::with_capacity(syllables.len());
        let mut i = 0;

        while i < syllables.len() {
            let max = MAX_PHRASE_SYLLABLES.min(syllables.len() - i);
            let mut taken = 1;
            for n in (2..=max).rev() {
                let candidate = syllables[i..i + n].join(" ");
                if compounds.contains(&candidate) {
                    taken = n;
                    break;
                }
            }
            out.push(syllables[i..i + taken].join(" "));
            i += taken;
        }

        out
    }
}

/// Tagger used when no backend is configured; contributes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTagger;

impl EntityTagger for NoTagger {
    fn entities(&self, _sentence: &str) -> usize {
        0
    }
}

impl PosTagger for NoTagger {
    fn content_words(&self, _sentence: &str, _lang: Language) -> usize {
        0
    }
}
