//! Canonical forms for comparing typed pinyin with expected answers.
//!
//! Two forms are used:
//!
//! * [`strip_tones`]: lower-cased, tone marks folded to their base letter and
//!   apostrophes turned into spaces. Nothing else is removed.
//! * [`normalize`]: the tone-stripped form with everything except letters,
//!   CJK ideographs and whitespace removed, and whitespace collapsed and
//!   trimmed.
//!
//! ```
//! # use pinyin_core::normalize::{answers_match, normalize};
//! assert_eq!(normalize("Nǐ  hǎo!"), "ni hao");
//! assert!(answers_match("ni hao", "nǐ hǎo"));
//! ```

/// Base letter for a toned vowel or syllabic n; apostrophes become a space.
fn fold(c: char) -> char {
    match c {
        'ā' | 'á' | 'ǎ' | 'à' => 'a',
        'ē' | 'é' | 'ě' | 'è' => 'e',
        'ī' | 'í' | 'ǐ' | 'ì' => 'i',
        'ō' | 'ó' | 'ǒ' | 'ò' => 'o',
        'ū' | 'ú' | 'ǔ' | 'ù' => 'u',
        'ǖ' | 'ǘ' | 'ǚ' | 'ǜ' => 'ü',
        'ń' | 'ň' | 'ǹ' => 'n',
        '\'' | '’' => ' ',
        other => other,
    }
}

/// Lower-case, fold tone marks and replace apostrophes with spaces.
#[must_use]
pub fn strip_tones(input: &str) -> String {
    input.to_lowercase().chars().map(fold).collect()
}

/// Full canonical form used for equality and prefix checks.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(input: &str) -> String {
    let folded = strip_tones(input);
    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;

    for c in folded.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        // Alphabetic covers Latin letters, ü and CJK ideographs alike.
        if !c.is_alphabetic() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Whether `input` is an acceptable answer for `expected`.
///
/// Accepts toned and toneless input. Empty input never matches a non-empty
/// expected answer.
#[must_use]
pub fn answers_match(input: &str, expected: &str) -> bool {
    let canonical_input = normalize(input);
    let canonical_expected = normalize(expected);
    if canonical_input.is_empty() && !canonical_expected.is_empty() {
        return false;
    }

    canonical_input == canonical_expected
        || strip_tones(input).trim() == strip_tones(expected).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_idempotent() {
        for sample in [
            "",
            "   ",
            "Nǐ hǎo!",
            "Xī'ān  ",
            "lǜ  sè,  hǎo",
            "我喜欢 chá。",
            "ZHŌNG   guó",
            "a\u{0304}",
        ] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn tones_are_ignored() {
        assert_eq!(normalize("nǐ hǎo"), normalize("ni hao"));
        assert!(answers_match("ni hao", "nǐ hǎo"));
        assert!(answers_match("nǐ hǎo", "nǐ hǎo"));
        assert!(answers_match("NI HAO", "nǐ hǎo"));
    }

    #[test]
    fn punctuation_is_ignored() {
        assert_eq!(normalize("nǐ hǎo!"), normalize("nǐ hǎo"));
        assert_eq!(normalize("nǐ, hǎo?"), "ni hao");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(normalize("  wǒ \t  men \n"), "wo men");
    }

    #[test]
    fn apostrophe_separates_syllables() {
        assert_eq!(normalize("Xī'ān"), "xi an");
        assert!(answers_match("xi an", "Xī'ān"));
        assert!(answers_match("xi’an", "Xī'ān"));
    }

    #[test]
    fn umlaut_and_syllabic_n_fold() {
        assert_eq!(strip_tones("lǜ"), "lü");
        assert_eq!(strip_tones("ǹg"), "ng");
        assert!(answers_match("lü", "lǜ"));
    }

    #[test]
    fn cjk_ideographs_are_kept() {
        assert_eq!(normalize("我是 wǒ。"), "我是 wo");
    }

    #[test]
    fn empty_input_never_matches() {
        assert_eq!(normalize(""), "");
        assert!(!answers_match("", "nǐ"));
        assert!(!answers_match("  !! ", "nǐ"));
    }

    #[test]
    fn wrong_syllable_does_not_match() {
        assert!(!answers_match("ni hai", "nǐ hǎo"));
        assert!(!answers_match("ni", "nǐ hǎo"));
    }
}
