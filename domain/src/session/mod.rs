//! Conversation session domain.
//!
//! - [`entities::Message`]: a single message within a thread
//! - [`entities::ThreadId`]: identifier of one conversational line
//! - [`key::MemoryKey`]: address of one thread in a conversation store
//! - [`invocation::InvocationState`]: the per-call message envelope
//! - [`response::Completion`]: what the provider returns

pub mod entities;
pub mod invocation;
pub mod key;
pub mod response;
