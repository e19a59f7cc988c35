//! Word selection policies for the three practice modes.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::{
    ItemId, ItemProgress, ParseSettingError, PracticeMode, ProgressRecord, VocabularyCategory,
    VocabularyItem,
};

/// Correct answers after which a word no longer needs review.
pub const DEFAULT_MASTERY_THRESHOLD: u32 = 3;

//
// ─── POLICY KNOBS ──────────────────────────────────────────────────────────────
//

/// What sequential mode does after the last word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequentialEnd {
    /// Single pass; the session ends on the last word.
    #[default]
    Complete,
    /// Start over from the first word.
    Wrap,
}

impl SequentialEnd {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Wrap => "wrap",
        }
    }
}

impl fmt::Display for SequentialEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequentialEnd {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "wrap" => Ok(Self::Wrap),
            _ => Err(ParseSettingError::new("sequential end", s)),
        }
    }
}

/// Which words review mode draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    /// Any word with at least one incorrect attempt.
    #[default]
    MistakesOnly,
    /// Words with a mistake and fewer than `threshold` correct attempts.
    Unmastered { threshold: u32 },
}

impl ReviewFilter {
    #[must_use]
    pub fn is_eligible(self, progress: Option<&ItemProgress>) -> bool {
        let Some(progress) = progress else {
            return false;
        };
        match self {
            Self::MistakesOnly => progress.has_mistakes(),
            Self::Unmastered { threshold } => {
                progress.has_mistakes() && progress.correct_count < threshold
            }
        }
    }
}

//
// ─── FILTERING ─────────────────────────────────────────────────────────────────
//

/// Items whose category is selected. No selected category yields no items.
#[must_use]
pub fn category_filtered(
    items: impl IntoIterator<Item = VocabularyItem>,
    categories: &[VocabularyCategory],
) -> Vec<VocabularyItem> {
    items
        .into_iter()
        .filter(|item| categories.contains(&item.category))
        .collect()
}

/// The words a session practices from `pool` (already category-filtered).
///
/// Review mode narrows the pool to review-eligible words and falls back to
/// the whole pool when none qualify.
#[must_use]
pub fn filtered_words(
    pool: &[VocabularyItem],
    mode: PracticeMode,
    progress: &ProgressRecord,
    review: ReviewFilter,
) -> Vec<VocabularyItem> {
    if mode != PracticeMode::Review {
        return pool.to_vec();
    }

    let eligible: Vec<VocabularyItem> = pool
        .iter()
        .filter(|item| review.is_eligible(progress.get(item.id.as_str())))
        .cloned()
        .collect();

    if eligible.is_empty() {
        pool.to_vec()
    } else {
        eligible
    }
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// Outcome of asking for a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the word list the selector was given.
    Word(usize),
    /// Sequential single pass reached the end.
    Completed,
    /// There is nothing to practice.
    Empty,
}

/// Picks words according to the practice mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSelector {
    mode: PracticeMode,
    sequential_end: SequentialEnd,
}

impl WordSelector {
    #[must_use]
    pub fn new(mode: PracticeMode, sequential_end: SequentialEnd) -> Self {
        Self {
            mode,
            sequential_end,
        }
    }

    #[must_use]
    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    /// First word of a session. Random mode prefers words not in `seen`.
    pub fn first<R: Rng + ?Sized>(
        &self,
        words: &[VocabularyItem],
        seen: &HashSet<ItemId>,
        rng: &mut R,
    ) -> Selection {
        if words.is_empty() {
            return Selection::Empty;
        }
        match self.mode {
            PracticeMode::Sequential => Selection::Word(0),
            PracticeMode::Random => pick_unseen(words, seen, None, rng),
            PracticeMode::Review => pick_avoiding(words, (0..words.len()).collect(), None, rng),
        }
    }

    /// Word after `current`. `previous` is the id just practiced; random and
    /// review modes avoid repeating it when another candidate exists.
    pub fn next<R: Rng + ?Sized>(
        &self,
        words: &[VocabularyItem],
        current: Option<usize>,
        previous: Option<&ItemId>,
        seen: &HashSet<ItemId>,
        rng: &mut R,
    ) -> Selection {
        if words.is_empty() {
            return Selection::Empty;
        }
        match self.mode {
            PracticeMode::Sequential => {
                let next = current.map_or(0, |index| index + 1);
                if next < words.len() {
                    Selection::Word(next)
                } else {
                    match self.sequential_end {
                        SequentialEnd::Complete => Selection::Completed,
                        SequentialEnd::Wrap => Selection::Word(0),
                    }
                }
            }
            PracticeMode::Random => pick_unseen(words, seen, previous, rng),
            PracticeMode::Review => {
                pick_avoiding(words, (0..words.len()).collect(), previous, rng)
            }
        }
    }
}

fn pick_unseen<R: Rng + ?Sized>(
    words: &[VocabularyItem],
    seen: &HashSet<ItemId>,
    previous: Option<&ItemId>,
    rng: &mut R,
) -> Selection {
    let unseen: Vec<usize> = (0..words.len())
        .filter(|&index| !seen.contains(&words[index].id))
        .collect();
    let pool = if unseen.is_empty() {
        (0..words.len()).collect()
    } else {
        unseen
    };
    pick_avoiding(words, pool, previous, rng)
}

fn pick_avoiding<R: Rng + ?Sized>(
    words: &[VocabularyItem],
    pool: Vec<usize>,
    previous: Option<&ItemId>,
    rng: &mut R,
) -> Selection {
    let alternatives: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&index| Some(&words[index].id) != previous)
        .collect();
    let candidates = if alternatives.is_empty() {
        &pool
    } else {
        &alternatives
    };
    candidates
        .choose(rng)
        .map_or(Selection::Empty, |&index| Selection::Word(index))
}
