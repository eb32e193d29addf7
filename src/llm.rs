//! Chat-completion client
//!
//! The client is either configured with credentials or explicitly
//! unconfigured; callers decide what an unconfigured client means for them.

use crate::config::OpenAiConfig;
use crate::error::{InsightError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use tracing::{debug, error};

/// System instruction sent with every completion
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
/// Sampling temperature
pub const TEMPERATURE: f32 = 0.7;
/// Upper bound on generated tokens
pub const MAX_TOKENS: u32 = 4000;

/// Credentialed connection to an OpenAI-compatible chat endpoint
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
}

impl OpenAiChat {
    /// Creates a chat client for `api_key`, optionally against a custom base URL
    pub fn new(api_key: &str, api_base: Option<&str>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base.trim_end_matches('/'));
        }
        Self {
            client: Client::with_config(config),
        }
    }

    #[allow(deprecated)]
    async fn chat(&self, prompt: &str, model: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| InsightError::LLM("Completion contained no text".into()))?;

        Ok(text.trim().to_string())
    }
}

/// Completion client handed to the orchestrator
#[derive(Clone)]
pub enum LlmClient {
    /// Credentials were supplied
    Configured(OpenAiChat),
    /// No credentials; no request will ever be sent
    Unconfigured,
}

impl LlmClient {
    /// Builds the client from configuration, unconfigured when no key is set
    pub fn from_config(config: &OpenAiConfig) -> Self {
        match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                Self::Configured(OpenAiChat::new(key, config.api_base.as_deref()))
            }
            _ => Self::Unconfigured,
        }
    }

    /// Whether completions can be requested at all
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Sends `prompt` as a single user turn and returns the trimmed reply
    pub async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        match self {
            Self::Configured(chat) => {
                debug!("Requesting completion from {} ({} prompt chars)", model, prompt.len());
                chat.chat(prompt, model).await
            }
            Self::Unconfigured => Err(InsightError::LLM(
                "Completion client is not configured".into(),
            )),
        }
    }

    /// Like [`complete`](Self::complete), but logs failures and yields an empty string
    pub async fn complete_or_empty(&self, prompt: &str, model: &str) -> String {
        match self.complete(prompt, model).await {
            Ok(text) => text,
            Err(e) => {
                error!("LLM call error: {}", e);
                String::new()
            }
        }
    }
}
