//! AI-generated paragraphs and the typing exercise built on them.

mod client;
mod practice;
mod prompt;
mod service;

pub use crate::error::ParagraphError;
pub use client::{
    ChatCompletionsClient, ChatCompletionsConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, REQUEST_TIMEOUT,
    TextGenerator,
};
pub use practice::{ParagraphFeedback, ParagraphPractice};
pub use prompt::paragraph_prompt;
pub use service::{ParagraphService, WORDS_PER_PARAGRAPH};
