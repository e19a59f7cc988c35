//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the paragraph generator and its HTTP client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParagraphError {
    #[error("paragraph generation is not configured")]
    Disabled,
    #[error("no vocabulary available for the selected level")]
    NoVocabulary,
    #[error("paragraph generation returned an empty response")]
    EmptyResponse,
    #[error("paragraph generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by practice sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no words match the selected categories")]
    Empty,
    #[error("session has not been started")]
    NotStarted,
    #[error("session already completed")]
    Completed,
    #[error("type the correct answer before moving on")]
    AnswerRequired,
    #[error("current word is already answered")]
    AlreadyAnswered,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
