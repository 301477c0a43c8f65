//! Port for structured conversation logging.
//!
//! Records every turn of the duet (requests, responses, failures) as
//! machine-readable events. This is separate from `tracing`-based operation
//! logs: tracing handles diagnostics, this port captures the transcript.

use duet_domain::TokenUsage;
use serde_json::{Value, json};

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "agent_request", "agent_response").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Prompt sent to an agent, after context wrapping.
    pub fn agent_request(agent: &str, thread: &str, context_from: Option<&str>, text: &str) -> Self {
        Self::new(
            "agent_request",
            json!({
                "agent": agent,
                "thread": thread,
                "context_from": context_from,
                "bytes": text.len(),
                "text": text,
            }),
        )
    }

    /// Reply produced by an agent.
    pub fn agent_response(agent: &str, thread: &str, usage: Option<&TokenUsage>, text: &str) -> Self {
        Self::new(
            "agent_response",
            json!({
                "agent": agent,
                "thread": thread,
                "usage": usage,
                "bytes": text.len(),
                "text": text,
            }),
        )
    }

    /// A failed turn.
    pub fn agent_error(agent: &str, thread: &str, error: &str) -> Self {
        Self::new(
            "agent_error",
            json!({
                "agent": agent,
                "thread": thread,
                "error": error,
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// The `log` method is synchronous and non-fallible so that logging can
/// never disrupt a turn; implementations swallow their own failures.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_response_payload() {
        let usage = TokenUsage::new(10, 5);
        let event = ConversationEvent::agent_response("gen", "t1", Some(&usage), "draft");
        assert_eq!(event.event_type, "agent_response");
        assert_eq!(event.payload["agent"], "gen");
        assert_eq!(event.payload["usage"]["total_tokens"], 15);
        assert_eq!(event.payload["bytes"], 5);
    }

    #[test]
    fn test_agent_request_without_context() {
        let event = ConversationEvent::agent_request("crit", "t2", None, "Review");
        assert!(event.payload["context_from"].is_null());
        assert_eq!(event.payload["thread"], "t2");
    }
}
