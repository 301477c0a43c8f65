//! Per-call invocation envelope

use super::entities::{Message, Role};

/// The messages sent to one agent in one call.
///
/// Created fresh for every call and dropped when the call returns; only the
/// messages themselves are persisted, by the conversation store.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationState {
    pub agent_name: String,
    pub messages: Vec<Message>,
}

impl InvocationState {
    pub fn new(agent_name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            agent_name: agent_name.into(),
            messages,
        }
    }

    /// Envelope holding a single user message.
    pub fn user(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(agent_name, vec![Message::user(content)])
    }

    /// Content of the last message, if any.
    pub fn final_text(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }

    /// The last message if it was produced by the assistant.
    pub fn response(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.role == Role::Assistant)
    }
}
