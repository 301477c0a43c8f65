//! Conversation memory backends
//!
//! Implementations of the [`ConversationStore`](duet_application::ConversationStore)
//! port.

mod in_memory;
mod jsonl_store;

pub use in_memory::InMemoryConversationStore;
pub use jsonl_store::JsonlConversationStore;
