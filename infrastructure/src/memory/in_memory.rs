//! Process-local conversation store.

use async_trait::async_trait;
use duet_application::{ConversationStore, StoreError};
use duet_domain::{MemoryKey, Message};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::RwLock;

/// Conversation store kept in process memory; lost on exit.
#[derive(Default)]
pub struct InMemoryConversationStore {
    threads: RwLock<HashMap<MemoryKey, Vec<Message>>>,
    generations: Mutex<HashMap<String, u32>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_generation(&self, agent: &str, generation: u32) {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let latest = generations.entry(agent.to_string()).or_default();
        *latest = (*latest).max(generation);
    }

    /// Number of threads that hold at least one message.
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, key: &MemoryKey, message: Message) -> Result<(), StoreError> {
        self.note_generation(&key.agent, key.generation);
        self.threads
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn read(&self, key: &MemoryKey) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .threads
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_all(&self, key: &MemoryKey, messages: Vec<Message>) -> Result<(), StoreError> {
        self.note_generation(&key.agent, key.generation);
        self.threads
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .extend(messages);
        Ok(())
    }

    fn latest_generation(&self, agent: &str) -> u32 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(agent)
            .copied()
            .unwrap_or(0)
    }

    fn start_generation(&self, agent: &str, generation: u32) -> Result<(), StoreError> {
        self.note_generation(agent, generation);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
