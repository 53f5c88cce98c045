//! Language detection from character composition.
//!
//! The detector looks only at the *distinct* lowercase characters of the input:
//! if more than 10% of them are Vietnamese diacritic letters the text is `vi`,
//! otherwise `en`. Input is NFC-normalized first so decomposed diacritics
//! (`e` + U+0301) count the same as precomposed ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Lowercase Vietnamese letters carrying a diacritic, plus `đ`.
pub const VIETNAMESE_DIACRITICS: &str =
    "àáạảãâầấậẩẫăằắặẳẵèéẹẻẽêềếệểễìíịỉĩòóọỏõôồốộổỗơờớợởỡùúụủũưừứựửữỳýỵỷỹđ";

/// Ratio above which text is classified as Vietnamese.
pub const VIETNAMESE_RATIO_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Vi,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }

    pub const ALL: [Language; 2] = [Language::En, Language::Vi];
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[inline]
pub fn is_vietnamese_diacritic(c: char) -> bool {
    VIETNAMESE_DIACRITICS.contains(c)
}

/// Fraction of distinct lowercase characters that are Vietnamese diacritics.
/// Empty input yields 0.0.
pub fn vietnamese_ratio(text: &str) -> f32 {
    let distinct: BTreeSet<char> = text.nfc().flat_map(char::to_lowercase).collect();
    if distinct.is_empty() {
        return 0.0;
    }
    let vi = distinct.iter().filter(|c| is_vietnamese_diacritic(**c)).count();
    vi as f32 / distinct.len() as f32
}

pub fn detect_language(text: &str) -> Language {
    if vietnamese_ratio(text) > VIETNAMESE_RATIO_THRESHOLD {
        Language::Vi
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_english() {
        assert_eq!(detect_language(""), Language::En);
        assert_eq!(vietnamese_ratio(""), 0.0);
    }

    #[test]
    fn plain_english_is_english() {
        assert_eq!(
            detect_language("Great job on the quarterly report."),
            Language::En
        );
    }

    #[test]
    fn vietnamese_sentence_is_detected() {
        assert_eq!(
            detect_language("Nhân viên làm việc rất tốt và chuyên nghiệp"),
            Language::Vi
        );
    }

    #[test]
    fn decomposed_diacritics_count_after_nfc() {
        // "tốt" spelled with combining marks
        let decomposed = "to\u{302}\u{301}t";
        assert!(vietnamese_ratio(decomposed) > 0.0);
    }

    #[test]
    fn ratio_uses_distinct_characters() {
        // 'ố' repeated does not raise the ratio above a single occurrence
        assert_eq!(vietnamese_ratio("ốốốốa"), vietnamese_ratio("ốa"));
    }

    #[test]
    fn language_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Vi).unwrap(), "\"vi\"");
    }
}
