use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::vocabulary::VocabularyItem;

/// A word inside a generated paragraph.
///
/// `position` is the zero-based character (not byte) offset where `chinese`
/// starts in the paragraph text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphWord {
    pub chinese: String,
    pub pinyin: String,
    #[serde(default)]
    pub english: String,
    pub position: usize,
}

/// Result of a paragraph generation call, classified once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedParagraph {
    /// The response was JSON; words are sorted by `position`.
    Parsed {
        paragraph: String,
        pinyin_answer: String,
        words: Vec<ParagraphWord>,
    },
    /// The response was not JSON; the raw text is shown as-is.
    Fallback { paragraph: String },
}

impl GeneratedParagraph {
    /// Classify a raw model response.
    ///
    /// `requested` are the vocabulary items the paragraph was asked to use; they
    /// are located in the text when the response carries no word list.
    #[must_use]
    pub fn from_response(raw: &str, requested: &[VocabularyItem]) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(strip_code_fence(raw)) else {
            return Self::Fallback {
                paragraph: raw.trim().to_string(),
            };
        };

        // Fields are read one at a time so a badly shaped one cannot sink the rest.
        let paragraph = text_field(&value, "paragraph")
            .unwrap_or_else(|| raw.trim())
            .to_string();
        let pinyin_answer = text_field(&value, "pinyinAnswer")
            .unwrap_or_default()
            .to_string();

        let listed = ["allWords", "words"]
            .into_iter()
            .find_map(|key| value.get(key).and_then(Value::as_array));
        let mut words = match listed {
            Some(entries) => entries
                .iter()
                .filter_map(|entry| ParagraphWord::deserialize(entry).ok())
                .collect(),
            None => locate_vocabulary(&paragraph, requested),
        };
        words.sort_by_key(|word| word.position);

        Self::Parsed {
            paragraph,
            pinyin_answer,
            words,
        }
    }

    #[must_use]
    pub fn paragraph(&self) -> &str {
        match self {
            Self::Parsed { paragraph, .. } | Self::Fallback { paragraph } => paragraph,
        }
    }

    #[must_use]
    pub fn words(&self) -> &[ParagraphWord] {
        match self {
            Self::Parsed { words, .. } => words,
            Self::Fallback { .. } => &[],
        }
    }

    #[must_use]
    pub fn pinyin_answer(&self) -> &str {
        match self {
            Self::Parsed { pinyin_answer, .. } => pinyin_answer,
            Self::Fallback { .. } => "",
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The transcription the learner is expected to type.
    ///
    /// Uses the model's full pinyin answer when present. Otherwise the text is
    /// rebuilt from the paragraph by substituting each word's pinyin at its
    /// position; text between words is kept. Empty when there is nothing to
    /// rebuild from.
    #[must_use]
    pub fn expected_pinyin(&self) -> String {
        let answer = self.pinyin_answer();
        if !answer.trim().is_empty() {
            return answer.to_string();
        }

        let words = self.words();
        let chars: Vec<char> = self.paragraph().chars().collect();
        if chars.is_empty() || words.is_empty() {
            return String::new();
        }

        let mut rebuilt = String::new();
        let mut cursor = 0;
        for word in words {
            let start = word.position.min(chars.len());
            if start > cursor {
                rebuilt.extend(&chars[cursor..start]);
            }
            rebuilt.push(' ');
            rebuilt.push_str(&word.pinyin);
            rebuilt.push(' ');
            let end = (start + word.chinese.chars().count()).min(chars.len());
            cursor = cursor.max(end);
        }
        rebuilt.extend(&chars[cursor..]);

        rebuilt.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Non-blank string field of a JSON object.
fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// Unwrap a ```json fenced block; anything else is returned trimmed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest.trim(),
        _ => body.trim(),
    }
}

/// Every occurrence of each requested item in `paragraph`.
fn locate_vocabulary(paragraph: &str, requested: &[VocabularyItem]) -> Vec<ParagraphWord> {
    let mut words = Vec::new();
    for item in requested {
        if item.chinese.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(offset) = paragraph[from..].find(&item.chinese) {
            let byte = from + offset;
            words.push(ParagraphWord {
                chinese: item.chinese.clone(),
                pinyin: item.pinyin.clone(),
                english: item.english.clone(),
                position: paragraph[..byte].chars().count(),
            });
            from = byte + paragraph[byte..].chars().next().map_or(1, char::len_utf8);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, VocabularyCategory};

    fn vocab(id: &str, chinese: &str, pinyin: &str) -> VocabularyItem {
        VocabularyItem {
            id: ItemId::new(id),
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: String::new(),
            category: VocabularyCategory::Other,
        }
    }

    #[test]
    fn json_response_is_parsed_and_sorted() {
        let raw = r#"{
            "paragraph": "你好，我有朋友。",
            "pinyinAnswer": "nǐ hǎo wǒ yǒu péng you",
            "allWords": [
                {"chinese": "朋友", "pinyin": "péng you", "english": "friend", "position": 5},
                {"chinese": "你好", "pinyin": "nǐ hǎo", "english": "hello", "position": 0},
                {"chinese": "我", "pinyin": "wǒ", "position": 3}
            ]
        }"#;
        let generated = GeneratedParagraph::from_response(raw, &[]);

        assert!(!generated.is_fallback());
        assert_eq!(generated.paragraph(), "你好，我有朋友。");
        let positions: Vec<_> = generated.words().iter().map(|w| w.position).collect();
        assert_eq!(positions, [0, 3, 5]);
        assert_eq!(generated.words()[1].english, "");
        assert_eq!(generated.expected_pinyin(), "nǐ hǎo wǒ yǒu péng you");
    }

    #[test]
    fn non_json_response_falls_back_to_raw_text() {
        let generated = GeneratedParagraph::from_response("  我喜欢茶。 \n", &[]);
        assert_eq!(
            generated,
            GeneratedParagraph::Fallback {
                paragraph: "我喜欢茶。".into()
            }
        );
        assert!(generated.words().is_empty());
        assert_eq!(generated.expected_pinyin(), "");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"paragraph\": \"我\", \"pinyinAnswer\": \"wǒ\", \"allWords\": []}\n```";
        let generated = GeneratedParagraph::from_response(raw, &[]);
        assert_eq!(generated.paragraph(), "我");
        assert_eq!(generated.pinyin_answer(), "wǒ");
    }

    #[test]
    fn missing_word_list_locates_requested_vocabulary() {
        let raw = r#"{"paragraph": "茶好，我喝茶。"}"#;
        let requested = [vocab("a", "茶", "chá"), vocab("b", "喝", "hē")];
        let generated = GeneratedParagraph::from_response(raw, &requested);

        let found: Vec<_> = generated
            .words()
            .iter()
            .map(|w| (w.chinese.as_str(), w.position))
            .collect();
        assert_eq!(found, [("茶", 0), ("喝", 4), ("茶", 5)]);
    }

    #[test]
    fn non_array_word_list_keeps_text_and_locates_vocabulary() {
        let raw = r#"{"paragraph":"我喝茶。","pinyinAnswer":"wǒ hē chá","allWords":"none"}"#;
        let requested = [vocab("a", "茶", "chá")];
        let generated = GeneratedParagraph::from_response(raw, &requested);

        assert_eq!(generated.paragraph(), "我喝茶。");
        assert_eq!(generated.pinyin_answer(), "wǒ hē chá");
        let found: Vec<_> = generated
            .words()
            .iter()
            .map(|w| (w.chinese.as_str(), w.position))
            .collect();
        assert_eq!(found, [("茶", 2)]);
    }

    #[test]
    fn both_word_lists_prefer_all_words() {
        let raw = r#"{
            "paragraph": "我喝茶。",
            "pinyinAnswer": "wǒ hē chá",
            "allWords": [{"chinese": "喝", "pinyin": "hē", "position": 1}],
            "words": []
        }"#;
        let generated = GeneratedParagraph::from_response(raw, &[]);

        assert_eq!(generated.paragraph(), "我喝茶。");
        assert_eq!(generated.pinyin_answer(), "wǒ hē chá");
        assert_eq!(generated.words().len(), 1);
        assert_eq!(generated.words()[0].pinyin, "hē");
    }

    #[test]
    fn words_key_is_accepted_alone() {
        let raw = r#"{"paragraph": "我", "words": [{"chinese": "我", "pinyin": "wǒ", "position": 0}]}"#;
        let generated = GeneratedParagraph::from_response(raw, &[]);
        assert_eq!(generated.words().len(), 1);
        assert_eq!(generated.expected_pinyin(), "wǒ");
    }

    #[test]
    fn malformed_word_entries_are_skipped() {
        let raw = r#"{"paragraph": "我", "allWords": [{"chinese": "我"}, {"chinese": "我", "pinyin": "wǒ", "position": 0}]}"#;
        let generated = GeneratedParagraph::from_response(raw, &[]);
        assert_eq!(generated.words().len(), 1);
    }

    #[test]
    fn expected_pinyin_is_rebuilt_from_positions() {
        let generated = GeneratedParagraph::Parsed {
            paragraph: "我喝茶。".into(),
            pinyin_answer: String::new(),
            words: vec![
                ParagraphWord {
                    chinese: "我".into(),
                    pinyin: "wǒ".into(),
                    english: String::new(),
                    position: 0,
                },
                ParagraphWord {
                    chinese: "喝".into(),
                    pinyin: "hē".into(),
                    english: String::new(),
                    position: 1,
                },
                ParagraphWord {
                    chinese: "茶".into(),
                    pinyin: "chá".into(),
                    english: String::new(),
                    position: 2,
                },
            ],
        };
        assert_eq!(generated.expected_pinyin(), "wǒ hē chá 。");
    }
}
