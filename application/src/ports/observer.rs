//! Invocation observer port
//!
//! Hooks around every completion request. Observers are purely
//! observational: the methods cannot fail and their outcome never changes the
//! result of the call.

use super::completion_gateway::CompletionError;
use duet_domain::TokenUsage;
use tracing::{info, warn};

/// Callbacks fired by [`AgentSession`](crate::use_cases::agent_session::AgentSession)
/// around each completion request.
pub trait InvocationObserver: Send + Sync {
    /// Called right before the completion request with the number of
    /// messages (history plus new) going in.
    fn before_completion(&self, agent: &str, message_count: usize);

    /// Called after a successful completion with the reported usage.
    fn after_completion(&self, agent: &str, usage: Option<&TokenUsage>);

    /// Called when the completion request failed.
    fn on_failure(&self, _agent: &str, _error: &CompletionError) {}
}

/// No-op observer for tests and when observation is disabled.
pub struct NoObserver;

impl InvocationObserver for NoObserver {
    fn before_completion(&self, _agent: &str, _message_count: usize) {}
    fn after_completion(&self, _agent: &str, _usage: Option<&TokenUsage>) {}
}

/// Observer that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl InvocationObserver for TracingObserver {
    fn before_completion(&self, agent: &str, message_count: usize) {
        info!(
            agent,
            message_count, "Agent {} is about to call model with {} messages", agent, message_count
        );
    }

    fn after_completion(&self, agent: &str, usage: Option<&TokenUsage>) {
        match usage {
            Some(usage) => info!(
                agent,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Agent {} usage data: {}",
                agent,
                usage
            ),
            None => info!(agent, "Agent {} usage data: not reported", agent),
        }
    }

    fn on_failure(&self, agent: &str, error: &CompletionError) {
        warn!(agent, "Agent {} completion failed: {}", agent, error);
    }
}
