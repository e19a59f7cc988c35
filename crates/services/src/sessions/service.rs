use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashSet};

use pinyin_core::Clock;
use pinyin_core::matching::percent;
use pinyin_core::model::{ItemId, PracticeMode, ProgressRecord, VocabularyItem};
use pinyin_core::normalize::{answers_match, normalize};
use pinyin_core::selection::{Selection, WordSelector};
use pinyin_core::stats::{Outcome, PracticeStats, SessionTally};

use super::config::SessionConfig;
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    /// Terminal; only reached by a single sequential pass.
    Completed,
}

/// Where the learner is on the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPhase {
    Answering,
    /// Answered correctly (or re-typed after a reveal); waiting for `next`.
    ReadyToAdvance,
    /// Wrong answer or revealed; the answer must be typed before `next`.
    AwaitingRetype,
}

/// What a submitted line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing but whitespace or punctuation was typed. Nothing recorded.
    Blank,
    Correct,
    Incorrect,
    /// The answer was typed after a reveal. Nothing recorded.
    Retyped,
    /// Still not the answer after a reveal.
    RetypeMismatch,
}

impl SubmitOutcome {
    #[must_use]
    pub fn ready_to_advance(self) -> bool {
        matches!(self, Self::Correct | Self::Retyped)
    }
}

/// Result of moving past the current word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Word(VocabularyItem),
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory practice session over a fixed, already-filtered word list.
///
/// Owns the running statistics and per-item progress so that every attempt is
/// applied in one place; the orchestrator persists them afterwards.
pub struct PracticeSession {
    words: Vec<VocabularyItem>,
    selector: WordSelector,
    status: SessionStatus,
    phase: AnswerPhase,
    current: Option<usize>,
    stats: PracticeStats,
    tally: SessionTally,
    progress: ProgressRecord,
    seen: HashSet<ItemId>,
    rng: StdRng,
    clock: Clock,
}

impl PracticeSession {
    #[must_use]
    pub fn new(
        words: Vec<VocabularyItem>,
        mode: PracticeMode,
        config: &SessionConfig,
        stats: PracticeStats,
        progress: ProgressRecord,
    ) -> Self {
        Self {
            words,
            selector: WordSelector::new(mode, config.sequential_end),
            status: SessionStatus::NotStarted,
            phase: AnswerPhase::Answering,
            current: None,
            stats,
            tally: SessionTally::default(),
            progress,
            seen: HashSet::new(),
            rng: StdRng::from_os_rng(),
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start from scratch: fresh seen-set, session counters and streak.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the word list is empty.
    pub fn start(&mut self) -> Result<&VocabularyItem, SessionError> {
        self.begin(HashSet::new(), None)
    }

    /// Start where a previous run left off.
    ///
    /// The sequential index is kept when it still points into the list, and
    /// practiced words are kept when they are still part of it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the word list is empty.
    pub fn resume(
        &mut self,
        current_index: usize,
        practiced: &BTreeSet<ItemId>,
    ) -> Result<&VocabularyItem, SessionError> {
        let seen = self
            .words
            .iter()
            .filter(|word| practiced.contains(&word.id))
            .map(|word| word.id.clone())
            .collect();
        let restored = (self.mode() == PracticeMode::Sequential
            && current_index < self.words.len())
        .then_some(current_index);
        self.begin(seen, restored)
    }

    fn begin(
        &mut self,
        seen: HashSet<ItemId>,
        restored: Option<usize>,
    ) -> Result<&VocabularyItem, SessionError> {
        self.stats = self.stats.with_streak_reset();
        self.tally = SessionTally::default();
        self.seen = seen;
        self.phase = AnswerPhase::Answering;
        self.current = None;

        let selection = match restored {
            Some(index) => Selection::Word(index),
            None => self.selector.first(&self.words, &self.seen, &mut self.rng),
        };
        let Selection::Word(index) = selection else {
            self.status = SessionStatus::NotStarted;
            tracing::info!(mode = %self.mode(), "no words to practice");
            return Err(SessionError::Empty);
        };

        self.status = SessionStatus::InProgress;
        self.show(index);
        tracing::info!(
            mode = %self.mode(),
            words = self.words.len(),
            index,
            "practice session started"
        );
        Ok(&self.words[index])
    }

    /// Check a typed answer against the current word.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted`/`Completed` outside a running session
    /// and `SessionError::AlreadyAnswered` once the word is done.
    pub fn submit(&mut self, input: &str) -> Result<SubmitOutcome, SessionError> {
        let index = self.active_index()?;
        if normalize(input).is_empty() {
            return Ok(SubmitOutcome::Blank);
        }
        let matches = answers_match(input, &self.words[index].pinyin);

        match self.phase {
            AnswerPhase::ReadyToAdvance => Err(SessionError::AlreadyAnswered),
            AnswerPhase::AwaitingRetype if matches => {
                self.phase = AnswerPhase::ReadyToAdvance;
                Ok(SubmitOutcome::Retyped)
            }
            AnswerPhase::AwaitingRetype => Ok(SubmitOutcome::RetypeMismatch),
            AnswerPhase::Answering if matches => {
                self.record(index, Outcome::Correct);
                self.phase = AnswerPhase::ReadyToAdvance;
                Ok(SubmitOutcome::Correct)
            }
            AnswerPhase::Answering => {
                self.record(index, Outcome::Incorrect);
                self.phase = AnswerPhase::AwaitingRetype;
                Ok(SubmitOutcome::Incorrect)
            }
        }
    }

    /// Reveal the current word. Counts as a miss unless already answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted`/`Completed` outside a running session.
    pub fn show_answer(&mut self) -> Result<&VocabularyItem, SessionError> {
        let index = self.active_index()?;
        if self.phase == AnswerPhase::Answering {
            self.record(index, Outcome::Incorrect);
            self.phase = AnswerPhase::AwaitingRetype;
        }
        Ok(&self.words[index])
    }

    /// Move past the current word according to the mode.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AnswerRequired` while a revealed answer has not
    /// been typed, and `SessionError::NotStarted`/`Completed` outside a
    /// running session.
    pub fn next(&mut self) -> Result<Advance, SessionError> {
        let index = self.active_index()?;
        if self.phase == AnswerPhase::AwaitingRetype {
            return Err(SessionError::AnswerRequired);
        }

        let previous = self.words[index].id.clone();
        let selection = self.selector.next(
            &self.words,
            Some(index),
            Some(&previous),
            &self.seen,
            &mut self.rng,
        );
        match selection {
            Selection::Word(next) => {
                self.show(next);
                Ok(Advance::Word(self.words[next].clone()))
            }
            Selection::Completed => {
                self.status = SessionStatus::Completed;
                self.current = None;
                tracing::info!(
                    correct = self.tally.correct,
                    incorrect = self.tally.incorrect,
                    "practice session completed"
                );
                Ok(Advance::Completed)
            }
            Selection::Empty => Err(SessionError::Empty),
        }
    }

    fn active_index(&self) -> Result<usize, SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::Completed => Err(SessionError::Completed),
            SessionStatus::InProgress => self.current.ok_or(SessionError::NotStarted),
        }
    }

    fn show(&mut self, index: usize) {
        self.current = Some(index);
        self.phase = AnswerPhase::Answering;
        self.seen.insert(self.words[index].id.clone());
    }

    fn record(&mut self, index: usize, outcome: Outcome) {
        let id = &self.words[index].id;
        self.stats = self.stats.apply(id, outcome);
        self.tally = self.tally.apply(outcome);
        self.progress.record(id, outcome.is_correct(), self.clock.now());
        tracing::debug!(item = %id, ?outcome, streak = self.stats.current_streak, "attempt recorded");
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn mode(&self) -> PracticeMode {
        self.selector.mode()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn phase(&self) -> AnswerPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&VocabularyItem> {
        self.current.map(|index| &self.words[index])
    }

    /// Index to persist; 0 once the session is over or before it starts.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current.unwrap_or(0)
    }

    #[must_use]
    pub fn words(&self) -> &[VocabularyItem] {
        &self.words
    }

    #[must_use]
    pub fn stats(&self) -> &PracticeStats {
        &self.stats
    }

    #[must_use]
    pub fn tally(&self) -> SessionTally {
        self.tally
    }

    #[must_use]
    pub fn progress_record(&self) -> &ProgressRecord {
        &self.progress
    }

    #[must_use]
    pub fn seen_words(&self) -> BTreeSet<ItemId> {
        self.seen.iter().cloned().collect()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.words.len();
        let current = match self.mode() {
            PracticeMode::Sequential => match self.current {
                Some(index) => index + 1,
                None if self.is_complete() => total,
                None => 0,
            },
            PracticeMode::Random => self
                .words
                .iter()
                .filter(|word| self.seen.contains(&word.id))
                .count(),
            PracticeMode::Review => self
                .words
                .iter()
                .filter(|word| {
                    self.progress
                        .get(word.id.as_str())
                        .is_some_and(|p| p.correct_count > p.incorrect_count)
                })
                .count(),
        };

        SessionProgress {
            mode: self.mode(),
            current,
            total,
            percent: percent(current, total),
            is_complete: self.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinyin_core::model::VocabularyCategory;
    use pinyin_core::selection::SequentialEnd;
    use pinyin_core::time::{fixed_clock, fixed_now};

    fn item(id: &str, pinyin: &str) -> VocabularyItem {
        VocabularyItem {
            id: ItemId::new(id),
            chinese: "字".into(),
            pinyin: pinyin.into(),
            english: String::new(),
            category: VocabularyCategory::Pronouns,
        }
    }

    fn words() -> Vec<VocabularyItem> {
        vec![item("a", "wǒ"), item("b", "nǐ"), item("c", "tā")]
    }

    fn session(mode: PracticeMode, end: SequentialEnd) -> PracticeSession {
        PracticeSession::new(
            words(),
            mode,
            &SessionConfig::default().with_sequential_end(end),
            PracticeStats::default(),
            ProgressRecord::new(),
        )
        .with_rng(StdRng::seed_from_u64(7))
        .with_clock(fixed_clock())
    }

    #[test]
    fn empty_word_list_is_an_empty_state() {
        let mut session = PracticeSession::new(
            Vec::new(),
            PracticeMode::Random,
            &SessionConfig::default(),
            PracticeStats::default(),
            ProgressRecord::new(),
        );
        assert!(matches!(session.start(), Err(SessionError::Empty)));
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert!(matches!(session.submit("wo"), Err(SessionError::NotStarted)));
    }

    #[test]
    fn sequential_pass_completes_after_last_word() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        assert_eq!(session.start().unwrap().id.as_str(), "a");

        for pinyin in ["wo", "ni", "ta"] {
            assert_eq!(session.submit(pinyin).unwrap(), SubmitOutcome::Correct);
            let _ = session.next().unwrap();
        }

        assert!(session.is_complete());
        assert_eq!(session.stats().best_streak, 3);
        assert_eq!(session.tally().accuracy(), 100);
        assert_eq!(session.progress().current, 3);
        assert_eq!(session.progress().percent, 100);
        assert!(matches!(session.next(), Err(SessionError::Completed)));
    }

    #[test]
    fn sequential_wrap_never_completes() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Wrap);
        session.start().unwrap();
        for _ in 0..3 {
            session.next().unwrap();
        }
        assert_eq!(session.current_word().unwrap().id.as_str(), "a");
        assert!(!session.is_complete());
    }

    #[test]
    fn wrong_answer_requires_retype_before_next() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        session.start().unwrap();

        assert_eq!(session.submit("ni").unwrap(), SubmitOutcome::Incorrect);
        assert_eq!(session.phase(), AnswerPhase::AwaitingRetype);
        assert!(matches!(session.next(), Err(SessionError::AnswerRequired)));

        assert_eq!(session.submit("ta").unwrap(), SubmitOutcome::RetypeMismatch);
        assert_eq!(session.submit("wǒ").unwrap(), SubmitOutcome::Retyped);
        assert!(session.next().is_ok());

        // One miss recorded, nothing for the retype.
        assert_eq!(session.stats().total_attempts, 1);
        assert_eq!(session.stats().correct_first_try, 0);
        let progress = session.progress_record().get("a").unwrap();
        assert_eq!((progress.correct_count, progress.incorrect_count), (0, 1));
        assert_eq!(progress.last_practiced, fixed_now());
    }

    #[test]
    fn show_answer_counts_once_and_resets_streak() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        session.start().unwrap();
        session.submit("wo").unwrap();
        session.next().unwrap();

        assert_eq!(session.show_answer().unwrap().pinyin, "nǐ");
        session.show_answer().unwrap();
        assert_eq!(session.stats().current_streak, 0);
        assert_eq!(session.stats().best_streak, 1);
        assert_eq!(session.tally().incorrect, 1);
        assert_eq!(session.stats().total_attempts, 2);
    }

    #[test]
    fn blank_input_records_nothing() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        session.start().unwrap();
        assert_eq!(session.submit("  ?! ").unwrap(), SubmitOutcome::Blank);
        assert_eq!(session.stats().total_attempts, 0);
        assert_eq!(session.phase(), AnswerPhase::Answering);
    }

    #[test]
    fn answered_word_cannot_be_scored_twice() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        session.start().unwrap();
        session.submit("wo").unwrap();
        assert!(matches!(
            session.submit("wo"),
            Err(SessionError::AlreadyAnswered)
        ));
    }

    #[test]
    fn show_answer_on_answered_word_only_reveals() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        session.start().unwrap();
        session.submit("wo").unwrap();

        assert_eq!(session.show_answer().unwrap().pinyin, "wǒ");
        assert_eq!(session.phase(), AnswerPhase::ReadyToAdvance);
        assert_eq!(session.stats().total_attempts, 1);
        assert_eq!(session.tally().incorrect, 0);
    }

    #[test]
    fn random_mode_sees_every_word_once_per_cycle() {
        let mut session = session(PracticeMode::Random, SequentialEnd::Complete);
        let mut ids = BTreeSet::new();
        ids.insert(session.start().unwrap().id.clone());
        for _ in 1..3 {
            if let Advance::Word(word) = session.next().unwrap() {
                ids.insert(word.id);
            }
        }
        assert_eq!(ids.len(), 3);
        assert_eq!(session.progress().current, 3);
        assert_eq!(session.seen_words(), ids);
    }

    #[test]
    fn start_resets_session_counters_but_keeps_best_streak() {
        let mut stats = PracticeStats::default();
        for id in ["x", "y"] {
            stats = stats.apply(&ItemId::new(id), Outcome::Correct);
        }
        let mut session = PracticeSession::new(
            words(),
            PracticeMode::Sequential,
            &SessionConfig::default(),
            stats,
            ProgressRecord::new(),
        );
        session.start().unwrap();
        assert_eq!(session.stats().current_streak, 0);
        assert_eq!(session.stats().best_streak, 2);
        assert_eq!(session.tally(), SessionTally::default());
    }

    #[test]
    fn resume_restores_valid_position() {
        let mut session = session(PracticeMode::Sequential, SequentialEnd::Complete);
        assert_eq!(session.resume(2, &BTreeSet::new()).unwrap().id.as_str(), "c");

        let mut stale = self::session(PracticeMode::Sequential, SequentialEnd::Complete);
        assert_eq!(stale.resume(10, &BTreeSet::new()).unwrap().id.as_str(), "a");
    }

    #[test]
    fn resume_keeps_practiced_words_in_random_mode() {
        let mut session = session(PracticeMode::Random, SequentialEnd::Complete);
        let practiced: BTreeSet<_> = [ItemId::new("a"), ItemId::new("b"), ItemId::new("gone")]
            .into_iter()
            .collect();
        let first = session.resume(0, &practiced).unwrap().id.clone();
        assert_eq!(first.as_str(), "c");
        assert_eq!(session.progress().current, 3);
    }

    #[test]
    fn review_progress_counts_recovered_words() {
        let mut progress = ProgressRecord::new();
        progress.record(&ItemId::new("a"), false, fixed_now());
        progress.record(&ItemId::new("a"), true, fixed_now());
        progress.record(&ItemId::new("a"), true, fixed_now());
        progress.record(&ItemId::new("b"), false, fixed_now());

        let mut session = PracticeSession::new(
            words(),
            PracticeMode::Review,
            &SessionConfig::default(),
            PracticeStats::default(),
            progress,
        );
        session.start().unwrap();
        let view = session.progress();
        assert_eq!((view.current, view.total, view.percent), (1, 3, 33));
    }
}
