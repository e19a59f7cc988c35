use rand::Rng;
use rand::seq::SliceRandom;
use std::ops::RangeInclusive;
use std::sync::Arc;

use pinyin_core::model::{GeneratedParagraph, LevelSelection, Vocabulary, VocabularyItem};
use storage::repository::PracticeStateRepository;

use super::client::TextGenerator;
use super::practice::ParagraphPractice;
use super::prompt::paragraph_prompt;
use crate::error::ParagraphError;

/// How many vocabulary items one paragraph is built around.
pub const WORDS_PER_PARAGRAPH: RangeInclusive<usize> = 5..=8;

/// Picks vocabulary, asks the generator for a paragraph and classifies the reply.
#[derive(Clone)]
pub struct ParagraphService {
    generator: Arc<dyn TextGenerator>,
    vocabulary: Arc<Vocabulary>,
    repo: Arc<dyn PracticeStateRepository>,
}

impl ParagraphService {
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        vocabulary: Arc<Vocabulary>,
        repo: Arc<dyn PracticeStateRepository>,
    ) -> Self {
        Self {
            generator,
            vocabulary,
            repo,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.generator.enabled()
    }

    /// Between 5 and 8 distinct random items of `level`, fewer if the level is smaller.
    pub fn pick_words<R: Rng>(
        &self,
        level: LevelSelection,
        rng: &mut R,
    ) -> Vec<VocabularyItem> {
        let mut pool = self.vocabulary.for_selection(level);
        pool.shuffle(rng);
        let count = rng.random_range(WORDS_PER_PARAGRAPH);
        pool.truncate(count);
        pool
    }

    /// Generate a paragraph for the persisted HSK level.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphError` when generation is disabled or fails, or when
    /// the level has no vocabulary.
    pub async fn generate(&self) -> Result<ParagraphPractice, ParagraphError> {
        let level = self.repo.load_state().await?.settings.level;
        let words = self.pick_words(level, &mut rand::rng());
        self.generate_with(&words, level).await
    }

    /// Generate a paragraph around the given words.
    ///
    /// # Errors
    ///
    /// Same as [`ParagraphService::generate`].
    pub async fn generate_with(
        &self,
        words: &[VocabularyItem],
        level: LevelSelection,
    ) -> Result<ParagraphPractice, ParagraphError> {
        if !self.generator.enabled() {
            return Err(ParagraphError::Disabled);
        }
        if words.is_empty() {
            return Err(ParagraphError::NoVocabulary);
        }

        let prompt = paragraph_prompt(words, level);
        let raw = self.generator.generate(&prompt).await.inspect_err(|err| {
            tracing::warn!(error = %err, "paragraph generation failed");
        })?;

        let generated = GeneratedParagraph::from_response(&raw, words);
        if generated.is_fallback() {
            tracing::warn!("paragraph response was not JSON; showing raw text");
        }
        Ok(ParagraphPractice::new(generated))
    }
}
