//! Completion response types.
//!
//! A [`Completion`] is what the completion provider returns for one request:
//! the assistant text plus whatever usage metadata the provider reported.

use super::entities::Message;
use serde::{Deserialize, Serialize};

/// Token accounting reported by the provider for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

impl std::fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "prompt={} completion={} total={}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

/// A single completion returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Assistant text.
    pub content: String,
    /// Usage metadata (if returned by the API).
    pub usage: Option<TokenUsage>,
    /// Model identifier (if returned by the API).
    pub model: Option<String>,
}

impl Completion {
    /// Create a text-only completion without metadata.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
            usage: None,
            model: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Convert into the assistant message appended to conversation memory.
    pub fn into_message(self) -> Message {
        Message::assistant(self.content).with_usage(self.usage)
    }
}
