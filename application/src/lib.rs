//! Application layer for agent-duet
//!
//! This crate contains the orchestrator, agent sessions and the port
//! definitions implemented by infrastructure adapters.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use ports::{
    completion_gateway::{CompletionError, CompletionGateway, CompletionRequest},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    conversation_store::{ConversationStore, StoreError},
    observer::{InvocationObserver, NoObserver, TracingObserver},
};
pub use use_cases::agent_session::{AgentSession, SessionError};
pub use use_cases::orchestrator::{Orchestrator, OrchestratorError};
