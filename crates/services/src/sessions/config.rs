use std::time::Duration;

use pinyin_core::selection::{ReviewFilter, SequentialEnd};

/// Default pause before advancing after a correct answer.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(200);

/// Runtime knobs for practice sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub sequential_end: SequentialEnd,
    pub review_filter: ReviewFilter,
    pub advance_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sequential_end: SequentialEnd::default(),
            review_filter: ReviewFilter::default(),
            advance_delay: DEFAULT_ADVANCE_DELAY,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_sequential_end(mut self, sequential_end: SequentialEnd) -> Self {
        self.sequential_end = sequential_end;
        self
    }

    #[must_use]
    pub fn with_review_filter(mut self, review_filter: ReviewFilter) -> Self {
        self.review_filter = review_filter;
        self
    }

    #[must_use]
    pub fn with_advance_delay(mut self, advance_delay: Duration) -> Self {
        self.advance_delay = advance_delay;
        self
    }
}
