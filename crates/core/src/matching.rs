//! Prefix-based progress scoring for paragraph typing.
//!
//! Everything here is recomputed from the current input on every keystroke,
//! so corrections and backspacing need no bookkeeping.

use std::collections::BTreeSet;

use crate::model::ParagraphWord;
use crate::normalize::normalize;

/// Score of the current input against an expected transcription.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParagraphProgress {
    /// Indices into the word list of words typed correctly so far.
    pub completed: BTreeSet<usize>,
    /// Length of the common prefix of normalized input and expected text.
    pub matching_chars: usize,
    pub expected_chars: usize,
    /// `matching_chars / expected_chars` as a rounded percentage, capped at 100.
    pub percent: u8,
    /// The normalized input is a prefix of the normalized expected text.
    pub on_track: bool,
    /// The normalized input equals the (non-empty) normalized expected text.
    pub is_complete: bool,
}

/// Score `input` against `expected`, marking which `words` are finished.
#[must_use]
pub fn track_paragraph(expected: &str, words: &[ParagraphWord], input: &str) -> ParagraphProgress {
    let expected_norm: Vec<char> = normalize(expected).chars().collect();
    let input_norm: Vec<char> = normalize(input).chars().collect();

    let matching_chars = expected_norm
        .iter()
        .zip(&input_norm)
        .take_while(|(e, i)| e == i)
        .count();

    ParagraphProgress {
        completed: completed_words(expected, words, &expected_norm, &input_norm),
        matching_chars,
        expected_chars: expected_norm.len(),
        percent: percent(matching_chars, expected_norm.len()),
        on_track: matching_chars == input_norm.len(),
        is_complete: !expected_norm.is_empty() && input_norm == expected_norm,
    }
}

/// Rounded share of `part` in `whole`, capped at 100; 0 when `whole` is 0.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part.saturating_mul(200) + whole) / (whole * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Words are located greedily left to right without overlap; a word whose
/// pinyin cannot be found is never completed and does not move the cursor.
fn completed_words(
    expected: &str,
    words: &[ParagraphWord],
    expected_norm: &[char],
    input_norm: &[char],
) -> BTreeSet<usize> {
    let lowered = expected.to_lowercase();
    let mut cursor = 0;
    let mut completed = BTreeSet::new();

    for (index, word) in words.iter().enumerate() {
        let needle = word.pinyin.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        let Some(found) = lowered[cursor..].find(&needle) else {
            continue;
        };
        let end = cursor + found + needle.len();
        cursor = end;

        let prefix_len = normalize(&lowered[..end]).chars().count();
        let typed = input_norm.get(..prefix_len);
        if typed.is_some() && typed == expected_norm.get(..prefix_len) {
            completed.insert(index);
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(chinese: &str, pinyin: &str, position: usize) -> ParagraphWord {
        ParagraphWord {
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: String::new(),
            position,
        }
    }

    fn sample_words() -> Vec<ParagraphWord> {
        vec![
            word("你", "nǐ", 0),
            word("好", "hǎo", 1),
            word("我", "wǒ", 3),
            word("好", "hǎo", 4),
        ]
    }

    const EXPECTED: &str = "nǐ hǎo wǒ hǎo";

    #[test]
    fn toneless_full_input_completes() {
        let progress = track_paragraph(EXPECTED, &sample_words(), "ni hao wo hao");
        assert!(progress.is_complete);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.completed, BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn partial_input_completes_leading_words() {
        let progress = track_paragraph(EXPECTED, &sample_words(), "ni hao w");
        assert!(!progress.is_complete);
        assert!(progress.on_track);
        assert_eq!(progress.completed, BTreeSet::from([0, 1]));
        // "ni hao w" is 8 of the 13 normalized chars.
        assert_eq!(progress.matching_chars, 8);
        assert_eq!(progress.percent, 62);
    }

    #[test]
    fn repeated_pinyin_is_matched_in_order() {
        // Both 好 share the same pinyin; only the first is done after "ni hao".
        let progress = track_paragraph(EXPECTED, &sample_words(), "ni hao");
        assert_eq!(progress.completed, BTreeSet::from([0, 1]));
    }

    #[test]
    fn mistake_stops_later_words() {
        let progress = track_paragraph(EXPECTED, &sample_words(), "ni hai wo hao");
        assert!(!progress.on_track);
        assert!(!progress.is_complete);
        assert_eq!(progress.completed, BTreeSet::from([0]));
        assert_eq!(progress.matching_chars, 5);
    }

    #[test]
    fn backspacing_recomputes_from_scratch() {
        let words = sample_words();
        let long = track_paragraph(EXPECTED, &words, "ni hao wo");
        let short = track_paragraph(EXPECTED, &words, "ni ha");
        assert_eq!(long.completed.len(), 3);
        assert_eq!(short.completed, BTreeSet::from([0]));
    }

    #[test]
    fn unknown_word_is_skipped() {
        let mut words = sample_words();
        words.insert(1, word("他", "tā", 9));
        let progress = track_paragraph(EXPECTED, &words, "ni hao wo hao");
        assert!(!progress.completed.contains(&1));
        assert_eq!(progress.completed, BTreeSet::from([0, 2, 3, 4]));
    }

    #[test]
    fn punctuation_in_expected_is_ignored() {
        let progress = track_paragraph("Nǐ hǎo! Wǒ hǎo.", &sample_words(), "ni hao wo hao");
        assert!(progress.is_complete);
        assert_eq!(progress.completed.len(), 4);
    }

    #[test]
    fn empty_expected_never_completes() {
        let progress = track_paragraph("", &[], "anything");
        assert!(!progress.is_complete);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.expected_chars, 0);

        let blank = track_paragraph("", &[], "");
        assert!(!blank.is_complete);
    }

    #[test]
    fn percent_rounds_and_caps() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(5, 4), 100);
        assert_eq!(percent(3, 0), 0);
    }
}
