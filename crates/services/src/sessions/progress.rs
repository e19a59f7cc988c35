use pinyin_core::model::PracticeMode;

/// Aggregated view of session progress, useful for UI.
///
/// What `current` counts depends on the mode: the 1-based position in
/// sequential mode, distinct words seen in random mode, and words answered
/// correctly more often than not in review mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub mode: PracticeMode,
    pub current: usize,
    pub total: usize,
    pub percent: u8,
    pub is_complete: bool,
}
