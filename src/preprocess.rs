//! Text normalization applied before keyword extraction and rule scoring.

use crate::language::is_vietnamese_diacritic;
use unicode_normalization::UnicodeNormalization;

/// NFC-normalize, lowercase, replace anything that is not alphanumeric,
/// whitespace or a Vietnamese diacritic with a space, collapse whitespace
/// runs and trim. Idempotent.
pub fn preprocess(text: &str) -> String {
    let mapped: String = text
        .nfc()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || is_vietnamese_diacritic(c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(preprocess("Great job!!  Well -- done."), "great job well done");
    }

    #[test]
    fn keeps_vietnamese_letters() {
        assert_eq!(preprocess("Chất lượng: KÉM!"), "chất lượng kém");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(preprocess("KPI 95%"), "kpi 95");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess(" ?!... "), "");
    }

    #[test]
    fn is_idempotent_on_mixed_input() {
        let once = preprocess("  Không  công bằng!!! Tính SAI 2 lần\t\n");
        assert_eq!(preprocess(&once), once);
    }
}
