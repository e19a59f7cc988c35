use std::collections::BTreeSet;

use pinyin_core::matching::{ParagraphProgress, track_paragraph};
use pinyin_core::model::{GeneratedParagraph, ParagraphWord};
use pinyin_core::normalize::normalize;

/// Live feedback for the paragraph typed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphFeedback {
    /// Nothing to score: no input yet, or nothing to score against.
    Idle,
    OnTrack { percent: u8 },
    Mismatch { percent: u8 },
    Complete,
    Revealed,
}

/// Typing exercise over one generated paragraph.
///
/// Scoring is recomputed from the whole input on every update and stops for
/// good once the paragraph is completed or the answer is revealed.
#[derive(Debug, Clone)]
pub struct ParagraphPractice {
    generated: GeneratedParagraph,
    expected: String,
    input: String,
    progress: ParagraphProgress,
    completed: bool,
    revealed: bool,
}

impl ParagraphPractice {
    #[must_use]
    pub fn new(generated: GeneratedParagraph) -> Self {
        let expected = generated.expected_pinyin();
        Self {
            generated,
            expected,
            input: String::new(),
            progress: ParagraphProgress::default(),
            completed: false,
            revealed: false,
        }
    }

    pub fn update_input(&mut self, input: &str) -> ParagraphFeedback {
        input.clone_into(&mut self.input);
        if !self.completed && !self.revealed {
            self.progress = track_paragraph(&self.expected, self.generated.words(), &self.input);
            if self.progress.is_complete {
                self.completed = true;
                tracing::info!(words = self.generated.words().len(), "paragraph completed");
            }
        }
        self.feedback()
    }

    #[must_use]
    pub fn feedback(&self) -> ParagraphFeedback {
        if self.revealed {
            return ParagraphFeedback::Revealed;
        }
        if self.completed {
            return ParagraphFeedback::Complete;
        }
        if self.expected.trim().is_empty() || normalize(&self.input).is_empty() {
            return ParagraphFeedback::Idle;
        }
        let percent = self.progress.percent;
        if self.progress.on_track {
            ParagraphFeedback::OnTrack { percent }
        } else {
            ParagraphFeedback::Mismatch { percent }
        }
    }

    /// Show the expected transcription and stop scoring.
    pub fn reveal(&mut self) -> &str {
        self.revealed = true;
        &self.expected
    }

    #[must_use]
    pub fn paragraph(&self) -> &str {
        self.generated.paragraph()
    }

    #[must_use]
    pub fn words(&self) -> &[ParagraphWord] {
        self.generated.words()
    }

    #[must_use]
    pub fn expected_pinyin(&self) -> &str {
        &self.expected
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Indices into [`ParagraphPractice::words`] typed correctly so far.
    #[must_use]
    pub fn completed_words(&self) -> &BTreeSet<usize> {
        &self.progress.completed
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.generated.is_fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practice() -> ParagraphPractice {
        let raw = r#"{
            "paragraph": "我喝茶。",
            "pinyinAnswer": "wǒ hē chá",
            "allWords": [
                {"chinese": "我", "pinyin": "wǒ", "position": 0},
                {"chinese": "喝", "pinyin": "hē", "position": 1},
                {"chinese": "茶", "pinyin": "chá", "position": 2}
            ]
        }"#;
        ParagraphPractice::new(GeneratedParagraph::from_response(raw, &[]))
    }

    #[test]
    fn feedback_follows_typing() {
        let mut practice = practice();
        assert_eq!(practice.update_input(""), ParagraphFeedback::Idle);
        assert_eq!(
            practice.update_input("wo h"),
            ParagraphFeedback::OnTrack { percent: 44 }
        );
        assert_eq!(practice.completed_words(), &BTreeSet::from([0]));
        assert!(matches!(
            practice.update_input("wo ha"),
            ParagraphFeedback::Mismatch { .. }
        ));
        assert_eq!(practice.update_input("Wǒ hē chá!"), ParagraphFeedback::Complete);
        assert_eq!(practice.completed_words().len(), 3);
    }

    #[test]
    fn completion_is_sticky() {
        let mut practice = practice();
        practice.update_input("wo he cha");
        assert_eq!(practice.update_input("wo"), ParagraphFeedback::Complete);
        assert!(practice.is_complete());
    }

    #[test]
    fn reveal_stops_scoring() {
        let mut practice = practice();
        practice.update_input("wo");
        assert_eq!(practice.reveal(), "wǒ hē chá");
        assert_eq!(practice.update_input("wo he cha"), ParagraphFeedback::Revealed);
        assert!(!practice.is_complete());
    }

    #[test]
    fn fallback_paragraph_is_never_scored() {
        let mut practice =
            ParagraphPractice::new(GeneratedParagraph::from_response("我喝茶。", &[]));
        assert!(practice.is_fallback());
        assert_eq!(practice.update_input("wo he cha"), ParagraphFeedback::Idle);
        assert!(!practice.is_complete());
    }
}
