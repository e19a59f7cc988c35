use async_trait::async_trait;
use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ParagraphError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Produces free text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn enabled(&self) -> bool;

    /// # Errors
    ///
    /// Returns `ParagraphError` when generation is unavailable or fails.
    async fn generate(&self, prompt: &str) -> Result<String, ParagraphError>;
}

#[derive(Clone, Debug)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatCompletionsConfig {
    /// Read `PINYIN_AI_API_KEY`, `PINYIN_AI_BASE_URL` and `PINYIN_AI_MODEL`.
    /// A missing or blank key disables generation.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PINYIN_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PINYIN_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("PINYIN_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// How long one paragraph request may take before it is abandoned.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI-compatible `chat/completions` client asking for a JSON object reply.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: Client,
    config: Option<ChatCompletionsConfig>,
}

impl ChatCompletionsClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ChatCompletionsConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ChatCompletionsConfig>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to a client without timeout");
                Client::new()
            });
        Self { http, config }
    }

    fn endpoint(config: &ChatCompletionsConfig) -> String {
        let base = config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ParagraphError> {
        let config = self.config.as_ref().ok_or(ParagraphError::Disabled)?;
        let request = CompletionRequest::json_reply(&config.model, prompt);

        tracing::debug!(model = %config.model, "requesting paragraph");
        let response = self
            .http
            .post(Self::endpoint(config))
            .bearer_auth(&config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "paragraph request rejected");
            return Err(ParagraphError::HttpStatus(status));
        }

        let reply: CompletionResponse = response.json().await?;
        reply.into_text().ok_or(ParagraphError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [PromptMessage<'a>; 1],
    temperature: f32,
    response_format: ResponseFormat,
}

impl<'a> CompletionRequest<'a> {
    fn json_reply(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [PromptMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct PromptMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl CompletionResponse {
    /// Text of the first choice, trimmed; `None` when blank or absent.
    fn into_text(self) -> Option<String> {
        let text = self.choices.into_iter().next()?.message.content?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Reply,
}

#[derive(Debug, Deserialize)]
struct Reply {
    content: Option<String>,
}
