//! Request/response bodies of the chat completions endpoint.

use duet_application::{CompletionError, CompletionRequest};
use duet_domain::{Completion, TokenUsage};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(super) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
pub(super) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<CompletionRequest<'_>> for ChatRequest {
    fn from(request: CompletionRequest<'_>) -> Self {
        let messages = request
            .conversation()
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();
        Self {
            model: request.model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(super) struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub(super) struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        let mut out = TokenUsage::new(usage.prompt_tokens, usage.completion_tokens);
        if let Some(total) = usage.total_tokens {
            out.total_tokens = total;
        }
        out
    }
}

impl ChatResponse {
    /// First choice as a [`Completion`].
    ///
    /// A response without choices, or whose first choice carries no text
    /// (refusals, tool-only messages), is not a usable reply.
    pub fn into_completion(self) -> Result<Completion, CompletionError> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            CompletionError::InvalidResponse("no choices in response".to_string())
        })?;
        let content = choice.message.content.ok_or_else(|| {
            CompletionError::InvalidResponse("empty message content".to_string())
        })?;
        Ok(Completion {
            content,
            usage: self.usage.map(TokenUsage::from),
            model: self.model,
        })
    }
}
