use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::matching::percent;
use crate::model::ItemId;

/// Result of one scored attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Long-lived practice statistics.
///
/// Updates go through [`PracticeStats::apply`], which returns the next value
/// instead of mutating in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeStats {
    pub total_attempts: u32,
    pub correct_first_try: u32,
    pub words_learned: BTreeSet<ItemId>,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl PracticeStats {
    #[must_use]
    pub fn apply(&self, item: &ItemId, outcome: Outcome) -> Self {
        let mut next = self.clone();
        next.total_attempts = next.total_attempts.saturating_add(1);
        match outcome {
            Outcome::Correct => {
                next.correct_first_try = next.correct_first_try.saturating_add(1);
                next.current_streak = next.current_streak.saturating_add(1);
                next.words_learned.insert(item.clone());
            }
            Outcome::Incorrect => next.current_streak = 0,
        }
        next.best_streak = next.best_streak.max(next.current_streak);
        next
    }

    /// Same statistics with the running streak cleared, as at session start.
    #[must_use]
    pub fn with_streak_reset(&self) -> Self {
        Self {
            current_streak: 0,
            ..self.clone()
        }
    }

    /// Share of first-try correct answers, 0 when nothing was attempted.
    #[must_use]
    pub fn accuracy(&self) -> u8 {
        accuracy(self.correct_first_try, self.total_attempts)
    }

    #[must_use]
    pub fn words_learned_count(&self) -> usize {
        self.words_learned.len()
    }
}

/// Per-session counters, reset on every start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTally {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionTally {
    #[must_use]
    pub fn apply(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => Self {
                correct: self.correct.saturating_add(1),
                ..self
            },
            Outcome::Incorrect => Self {
                incorrect: self.incorrect.saturating_add(1),
                ..self
            },
        }
    }

    #[must_use]
    pub fn total(self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    #[must_use]
    pub fn accuracy(self) -> u8 {
        accuracy(self.correct, self.total())
    }
}

/// `round(correct / total * 100)`, defined as 0 for `total == 0`.
#[must_use]
pub fn accuracy(correct: u32, total: u32) -> u8 {
    percent(correct as usize, total as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw)
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        let stats = PracticeStats::default();
        assert_eq!(stats.accuracy(), 0);
        assert_eq!(SessionTally::default().accuracy(), 0);
    }

    #[test]
    fn correct_answers_build_a_streak() {
        let stats = PracticeStats::default()
            .apply(&id("a"), Outcome::Correct)
            .apply(&id("b"), Outcome::Correct)
            .apply(&id("a"), Outcome::Correct);

        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.correct_first_try, 3);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.words_learned_count(), 2);
        assert_eq!(stats.accuracy(), 100);
    }

    #[test]
    fn incorrect_resets_streak_but_not_best() {
        let stats = PracticeStats::default()
            .apply(&id("a"), Outcome::Correct)
            .apply(&id("b"), Outcome::Correct)
            .apply(&id("c"), Outcome::Incorrect);

        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 2);
        assert!(!stats.words_learned.contains(&id("c")));
        assert_eq!(stats.accuracy(), 67);

        let stats = stats.apply(&id("c"), Outcome::Correct);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 2);
        assert!(stats.current_streak <= stats.best_streak);
    }

    #[test]
    fn apply_leaves_previous_value_untouched() {
        let before = PracticeStats::default();
        let after = before.apply(&id("a"), Outcome::Correct);
        assert_eq!(before.total_attempts, 0);
        assert_eq!(after.total_attempts, 1);
    }

    #[test]
    fn streak_reset_keeps_best() {
        let stats = PracticeStats::default()
            .apply(&id("a"), Outcome::Correct)
            .with_streak_reset();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 1);
    }

    #[test]
    fn session_tally_counts_both_outcomes() {
        let tally = SessionTally::default()
            .apply(Outcome::Correct)
            .apply(Outcome::Incorrect)
            .apply(Outcome::Incorrect);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.accuracy(), 33);
    }

    #[test]
    fn stats_deserialize_from_camel_case() {
        let raw = r#"{"totalAttempts":4,"correctFirstTry":3,"wordsLearned":["a"],"currentStreak":1,"bestStreak":2}"#;
        let stats: PracticeStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.accuracy(), 75);
        assert_eq!(stats.words_learned_count(), 1);
    }
}
