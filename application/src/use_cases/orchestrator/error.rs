//! Orchestrator error taxonomy.

use crate::use_cases::agent_session::SessionError;
use thiserror::Error;

/// Errors surfaced by [`Orchestrator`](super::Orchestrator).
///
/// Provider failures are translated here; callers never see adapter types.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A required setup step was skipped (no credential, no main task).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The referenced agent name is not registered.
    #[error("agent not found: {0}")]
    NotFound(String),

    /// The completion provider rejected the credential.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Any other completion or memory failure while talking to an agent.
    #[error("failed talking to agent {agent}")]
    Invocation {
        agent: String,
        #[source]
        source: SessionError,
    },
}

impl OrchestratorError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        OrchestratorError::Configuration(message.into())
    }

    /// Translate a session failure at the orchestrator boundary.
    pub(crate) fn from_session(agent: &str, error: SessionError) -> Self {
        if error.is_auth_failure() {
            return OrchestratorError::Authentication("invalid credential".to_string());
        }
        OrchestratorError::Invocation {
            agent: agent.to_string(),
            source: error,
        }
    }

    /// Whether repeating the same call later may succeed.
    ///
    /// Only transient completion failures qualify; the orchestrator itself
    /// never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            OrchestratorError::Invocation {
                source: SessionError::Completion(e),
                ..
            } => e.is_transient(),
            _ => false,
        }
    }

    /// Name of the agent a failed invocation was addressed to.
    pub fn agent(&self) -> Option<&str> {
        match self {
            OrchestratorError::NotFound(agent) | OrchestratorError::Invocation { agent, .. } => {
                Some(agent)
            }
            _ => None,
        }
    }
}
