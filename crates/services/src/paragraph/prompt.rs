use pinyin_core::model::{LevelSelection, VocabularyItem};

/// Instructions asking the model for a short paragraph built around `words`.
///
/// The reply format matches what `GeneratedParagraph::from_response` reads.
#[must_use]
pub fn paragraph_prompt(words: &[VocabularyItem], level: LevelSelection) -> String {
    let level = level.as_str().to_uppercase();
    let word_lines: Vec<String> = words
        .iter()
        .map(|word| format!("{} ({}) - {}", word.chinese, word.pinyin, word.english))
        .collect();

    format!(
        r#"Write a short, natural Chinese paragraph of 2-3 sentences for a {level} learner using these words:
{words}

Rules:
1. Use every listed word at least once.
2. Only use characters and words from {level} vocabulary.
3. Other {level} words may be added so the sentences read naturally.
4. Keep the grammar correct and the tone conversational.
5. Reply with JSON only, in exactly this shape:
{{
  "paragraph": "the Chinese paragraph",
  "pinyinAnswer": "pinyin of the whole paragraph",
  "allWords": [
    {{"chinese": "我", "pinyin": "wǒ", "english": "I", "position": 0}}
  ]
}}

Notes:
- "allWords" lists every word of the paragraph in order.
- "position" is the character index where the word starts in "paragraph".
- "pinyinAnswer" is lowercase pinyin with tone marks, words separated by single spaces, and no punctuation."#,
        words = word_lines.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinyin_core::model::{ItemId, VocabularyCategory};

    #[test]
    fn prompt_lists_words_and_level() {
        let words = [VocabularyItem {
            id: ItemId::new("hsk1-024"),
            chinese: "茶".into(),
            pinyin: "chá".into(),
            english: "tea".into(),
            category: VocabularyCategory::Food,
        }];
        let prompt = paragraph_prompt(&words, LevelSelection::Hsk1To2);
        assert!(prompt.contains("茶 (chá) - tea"));
        assert!(prompt.contains("HSK1-2 learner"));
        assert!(prompt.contains("\"pinyinAnswer\""));
        assert!(prompt.contains("\"allWords\""));
    }
}
