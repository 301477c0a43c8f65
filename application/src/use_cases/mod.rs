//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_session;
pub mod orchestrator;
