mod config;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use config::{DEFAULT_ADVANCE_DELAY, SessionConfig};
pub use progress::SessionProgress;
pub use service::{Advance, AnswerPhase, PracticeSession, SessionStatus, SubmitOutcome};
pub use workflow::{AnswerResult, PracticeLoopService};
