use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

use pinyin_core::model::{PracticeMode, Vocabulary, VocabularyItem};
use pinyin_core::selection::{category_filtered, filtered_words};
use storage::layout::PracticeState;
use storage::repository::PracticeStateRepository;

use super::config::SessionConfig;
use super::service::{Advance, PracticeSession, SubmitOutcome};
use crate::Clock;
use crate::error::SessionError;
use crate::pacing::Pacer;

/// Result of submitting one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: SubmitOutcome,
    /// Set when the answer finished the word and the session moved on.
    pub advance: Option<Advance>,
}

/// Orchestrates session start, pacing and persistence around `PracticeSession`.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    config: SessionConfig,
    vocabulary: Arc<Vocabulary>,
    repo: Arc<dyn PracticeStateRepository>,
    pacer: Arc<dyn Pacer>,
    seed: Option<u64>,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: SessionConfig,
        vocabulary: Arc<Vocabulary>,
        repo: Arc<dyn PracticeStateRepository>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            clock,
            config,
            vocabulary,
            repo,
            pacer,
            seed: None,
        }
    }

    /// Use a deterministic word order for every session this service opens.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Words a session would practice under `state`'s settings and progress.
    #[must_use]
    pub fn word_list(&self, state: &PracticeState) -> Vec<VocabularyItem> {
        let settings = &state.settings;
        let pool = category_filtered(
            self.vocabulary.for_selection(settings.level),
            &settings.selected_categories,
        );
        filtered_words(
            &pool,
            settings.mode,
            &state.progress,
            self.config.review_filter,
        )
    }

    /// Start a new session from the first word.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when no word matches the settings, or
    /// `SessionError::Storage` for persistence failures.
    pub async fn start_session(&self) -> Result<PracticeSession, SessionError> {
        self.open(false).await
    }

    /// Start a session at the persisted position.
    ///
    /// # Errors
    ///
    /// Same as [`PracticeLoopService::start_session`].
    pub async fn resume_session(&self) -> Result<PracticeSession, SessionError> {
        self.open(true).await
    }

    async fn open(&self, resume: bool) -> Result<PracticeSession, SessionError> {
        let state = self.repo.load_state().await?;
        let words = self.word_list(&state);
        let mut session = PracticeSession::new(
            words,
            state.settings.mode,
            &self.config,
            state.stats.clone(),
            state.progress.clone(),
        )
        .with_clock(self.clock);
        if let Some(seed) = self.seed {
            session = session.with_rng(StdRng::seed_from_u64(seed));
        }

        if resume {
            session.resume(state.current_index, &state.practiced_words)?;
        } else {
            session.start()?;
        }
        self.persist(&session).await?;
        Ok(session)
    }

    /// Score `input`; after a finished word, pause and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from the session or from persistence.
    pub async fn submit(
        &self,
        session: &mut PracticeSession,
        input: &str,
    ) -> Result<AnswerResult, SessionError> {
        let outcome = session.submit(input)?;
        if matches!(outcome, SubmitOutcome::Correct | SubmitOutcome::Incorrect) {
            self.persist(session).await?;
        }

        let advance = if outcome.ready_to_advance() {
            self.pacer.pause(self.config.advance_delay).await;
            Some(self.advance(session).await?)
        } else {
            None
        };

        Ok(AnswerResult { outcome, advance })
    }

    /// Reveal the current word and persist the recorded miss.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from the session or from persistence.
    pub async fn show_answer(
        &self,
        session: &mut PracticeSession,
    ) -> Result<VocabularyItem, SessionError> {
        let word = session.show_answer()?.clone();
        self.persist(session).await?;
        Ok(word)
    }

    /// Move to the next word and persist the position.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AnswerRequired` while a revealed answer has not
    /// been typed, or persistence errors.
    pub async fn advance(&self, session: &mut PracticeSession) -> Result<Advance, SessionError> {
        let advance = session.next()?;
        self.persist(session).await?;
        Ok(advance)
    }

    async fn persist(&self, session: &PracticeSession) -> Result<(), SessionError> {
        let mut state = self.repo.load_state().await?;
        state.stats = session.stats().clone();
        state.progress = session.progress_record().clone();
        state.current_index = session.current_index();
        if session.mode() == PracticeMode::Random {
            state.practiced_words = session.seen_words();
        }
        self.repo.save_state(&state).await?;
        Ok(())
    }
}
