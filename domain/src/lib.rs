//! Domain layer for agent-duet
//!
//! This crate contains the entities and value objects of the duet.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents and threads
//!
//! - **Agent**: a named identity (system prompt + model + sampling)
//! - **Thread**: an isolated conversational line within one agent's memory
//!
//! ## Context hand-off
//!
//! One agent's last output is wrapped together with the next instruction and
//! the shared [`MainTask`] by [`ContextWrapper`] before it reaches the other
//! agent.

pub mod agent;
pub mod config;
pub mod core;
pub mod prompt;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use agent::{
    identity::{AgentIdentity, DEFAULT_TEMPERATURE},
    role::AgentRole,
};
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{credential::Credential, error::DomainError, model::Model, task::MainTask};
pub use prompt::{ContextWrapper, PromptTemplate};
pub use session::{
    entities::{Message, Role, ThreadId},
    invocation::InvocationState,
    key::MemoryKey,
    response::{Completion, TokenUsage},
};
