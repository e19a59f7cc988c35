use std::sync::Arc;

use pinyin_core::model::PracticeSettings;
use pinyin_core::stats::PracticeStats;
use storage::layout::PracticeState;
use storage::repository::PracticeStateRepository;

use crate::error::SettingsServiceError;

/// Lifetime statistics as shown on the stats screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub stats: PracticeStats,
    pub accuracy: u8,
    pub words_learned: usize,
    /// Words with at least one recorded attempt.
    pub tracked_words: usize,
    pub words_with_mistakes: usize,
}

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn PracticeStateRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn PracticeStateRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<PracticeSettings, SettingsServiceError> {
        Ok(self.repo.load_state().await?.settings)
    }

    /// Persist new settings.
    ///
    /// A change to the word list (categories, mode or level) also rewinds the
    /// saved position and forgets the practiced-word set.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn save(
        &self,
        settings: PracticeSettings,
    ) -> Result<PracticeSettings, SettingsServiceError> {
        let mut state = self.repo.load_state().await?;
        if state.settings.changes_word_list(&settings) {
            tracing::info!(
                mode = %settings.mode,
                level = %settings.level,
                "word list changed; resetting position"
            );
            state.current_index = 0;
            state.practiced_words.clear();
        }
        state.settings = settings.clone();
        self.repo.save_state(&state).await?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn summary(&self) -> Result<StatsSummary, SettingsServiceError> {
        let state = self.repo.load_state().await?;
        let words_with_mistakes = state
            .progress
            .iter()
            .filter(|(_, progress)| progress.has_mistakes())
            .count();
        Ok(StatsSummary {
            accuracy: state.stats.accuracy(),
            words_learned: state.stats.words_learned_count(),
            tracked_words: state.progress.len(),
            words_with_mistakes,
            stats: state.stats,
        })
    }

    /// Forget statistics, per-word progress, position and practiced words.
    /// Settings are kept. The whole state is replaced in a single write.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn reset(&self) -> Result<(), SettingsServiceError> {
        let settings = self.load().await?;
        self.repo
            .save_state(&PracticeState {
                settings,
                ..PracticeState::default()
            })
            .await?;
        tracing::info!("practice progress reset");
        Ok(())
    }
}
