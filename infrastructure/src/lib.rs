//! Infrastructure layer for agent-duet
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod memory;
pub mod openai;

// Re-export commonly used types
pub use config::{ConfigLoader, FileAgentEntry, FileConfig, FileStep, MemoryBackend};
pub use logging::JsonlConversationLogger;
pub use memory::{InMemoryConversationStore, JsonlConversationStore};
pub use openai::OpenAiCompletionGateway;
