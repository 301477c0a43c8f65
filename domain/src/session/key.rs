//! Conversation store addressing

use super::entities::ThreadId;
use serde::{Deserialize, Serialize};

/// Address of one thread of one agent session.
///
/// `generation` distinguishes successive registrations of the same agent
/// name, so a replaced agent starts from an empty
/// memory while the store itself stays append-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryKey {
    pub agent: String,
    pub generation: u32,
    pub thread: ThreadId,
}

impl MemoryKey {
    pub fn new(agent: impl Into<String>, generation: u32, thread: ThreadId) -> Self {
        Self {
            agent: agent.into(),
            generation,
            thread,
        }
    }
}

impl std::fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}/{}", self.agent, self.generation, self.thread)
    }
}
