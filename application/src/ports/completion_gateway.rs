//! Completion Gateway port
//!
//! Defines the interface for requesting text completions from an LLM provider.

use async_trait::async_trait;
use duet_domain::{Completion, Credential, Message, Model};
use thiserror::Error;

/// Errors that can occur during a completion request
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Request failed (status {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// The provider rejected the credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CompletionError::Authentication(_))
    }

    /// The same request may succeed if repeated later.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::RateLimited(_)
            | CompletionError::Connection(_)
            | CompletionError::Timeout => true,
            CompletionError::RequestFailed { status, .. } => *status >= 500,
            CompletionError::Authentication(_) | CompletionError::InvalidResponse(_) => false,
        }
    }
}

/// Everything the provider needs for one completion.
///
/// `history` is the thread's stored memory, `new_messages` the messages of the
/// current call; the provider sees them in that order after the system prompt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub model: &'a Model,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub credential: &'a Credential,
    pub history: &'a [Message],
    pub new_messages: &'a [Message],
}

impl CompletionRequest<'_> {
    /// Full conversation as sent to the provider, system prompt first.
    pub fn conversation(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(1 + self.history.len() + self.new_messages.len());
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt));
        }
        messages.extend(self.history.iter().cloned());
        messages.extend(self.new_messages.iter().cloned());
        messages
    }

    /// Number of non-system messages going in.
    pub fn message_count(&self) -> usize {
        self.history.len() + self.new_messages.len()
    }
}

/// Gateway for LLM completions
///
/// This port defines how the application layer reaches the completion
/// provider. Implementations (adapters) live in the infrastructure layer and
/// must translate provider failures into [`CompletionError`].
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request one completion. A single attempt; no retries.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, CompletionError>;

    /// Provider name used in logs
    fn provider(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_order() {
        let credential = Credential::new("sk").unwrap();
        let model = Model::Gpt4oMini;
        let history = vec![Message::user("q1"), Message::assistant("a1")];
        let new_messages = vec![Message::user("q2")];
        let request = CompletionRequest {
            system_prompt: "You draft ideas",
            model: &model,
            temperature: 0.7,
            max_output_tokens: None,
            credential: &credential,
            history: &history,
            new_messages: &new_messages,
        };

        let contents: Vec<_> = request
            .conversation()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["You draft ideas", "q1", "a1", "q2"]);
        assert_eq!(request.message_count(), 3);
    }

    #[test]
    fn test_error_classification() {
        assert!(CompletionError::Authentication("bad key".into()).is_auth_failure());
        assert!(!CompletionError::Timeout.is_auth_failure());

        assert!(CompletionError::Timeout.is_transient());
        assert!(CompletionError::RateLimited("slow down".into()).is_transient());
        assert!(
            CompletionError::RequestFailed {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !CompletionError::RequestFailed {
                status: 400,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!CompletionError::Authentication("x".into()).is_transient());
    }
}
