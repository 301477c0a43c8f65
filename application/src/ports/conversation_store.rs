//! Conversation store port
//!
//! Append-only, keyed message log. Each [`MemoryKey`] addresses one thread of
//! one agent session; entries under different keys never mix.

use async_trait::async_trait;
use duet_domain::{MemoryKey, Message};
use thiserror::Error;

/// Errors raised by a conversation store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt record at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// Storage backend for conversation memory.
///
/// Implementations must keep messages of one key in append order and must
/// make [`append_all`](Self::append_all) atomic with respect to concurrent
/// readers and writers of the same key.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one message to the end of a thread.
    async fn append(&self, key: &MemoryKey, message: Message) -> Result<(), StoreError>;

    /// Read a thread, oldest message first. Unknown keys read as empty.
    async fn read(&self, key: &MemoryKey) -> Result<Vec<Message>, StoreError>;

    /// Append several messages as one unit.
    ///
    /// The default implementation appends one by one; backends that can write
    /// a batch in one step should override it.
    async fn append_all(&self, key: &MemoryKey, messages: Vec<Message>) -> Result<(), StoreError> {
        for message in messages {
            self.append(key, message).await?;
        }
        Ok(())
    }

    /// Highest generation ever started or written for `agent`; 0 if none.
    ///
    /// Durable backends must remember generations across restarts so a
    /// replaced agent never reuses the number of an earlier registration.
    fn latest_generation(&self, _agent: &str) -> u32 {
        0
    }

    /// Mark `generation` of `agent` as started, before it holds any message.
    fn start_generation(&self, _agent: &str, _generation: u32) -> Result<(), StoreError> {
        Ok(())
    }

    /// Backend name used in logs
    fn backend(&self) -> &'static str;
}
