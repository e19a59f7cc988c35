#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod pacing;
pub mod paragraph;
pub mod sessions;
pub mod settings_service;

pub use pinyin_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ParagraphError, SessionError, SettingsServiceError};
pub use pacing::{Pacer, TokioPacer};
pub use settings_service::{SettingsService, StatsSummary};

pub use sessions::{
    Advance, AnswerPhase, AnswerResult, PracticeLoopService, PracticeSession, SessionConfig,
    SessionProgress, SessionStatus, SubmitOutcome,
};
