use std::sync::Arc;

use pinyin_core::model::Vocabulary;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::pacing::{Pacer, TokioPacer};
use crate::paragraph::{ChatCompletionsClient, ParagraphService, TextGenerator};
use crate::sessions::{PracticeLoopService, SessionConfig};
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    vocabulary: Arc<Vocabulary>,
    practice_loop: Arc<PracticeLoopService>,
    settings: Arc<SettingsService>,
    paragraphs: Arc<ParagraphService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and real-time pacing.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: SessionConfig,
        vocabulary: Vocabulary,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(
            &storage,
            clock,
            config,
            vocabulary,
            Arc::new(TokioPacer),
            Arc::new(ChatCompletionsClient::from_env()),
        ))
    }

    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        clock: Clock,
        config: SessionConfig,
        vocabulary: Vocabulary,
        pacer: Arc<dyn Pacer>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let vocabulary = Arc::new(vocabulary);
        tracing::info!(words = vocabulary.len(), "vocabulary loaded");

        let practice_loop = Arc::new(PracticeLoopService::new(
            clock,
            config,
            Arc::clone(&vocabulary),
            Arc::clone(&storage.practice),
            pacer,
        ));
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.practice)));
        let paragraphs = Arc::new(ParagraphService::new(
            generator,
            Arc::clone(&vocabulary),
            Arc::clone(&storage.practice),
        ));

        Self {
            vocabulary,
            practice_loop,
            settings,
            paragraphs,
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> Arc<Vocabulary> {
        Arc::clone(&self.vocabulary)
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn paragraphs(&self) -> Arc<ParagraphService> {
        Arc::clone(&self.paragraphs)
    }
}
