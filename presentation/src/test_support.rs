//! Test doubles for driving a real orchestrator without a provider.

use async_trait::async_trait;
use duet_application::{
    CompletionError, CompletionGateway, CompletionRequest, ConversationStore, StoreError,
};
use duet_domain::{Completion, MemoryKey, Message};
use std::collections::HashMap;
use std::sync::Mutex;

/// Replies with `"<model>: <prompt>"` and records every prompt.
#[derive(Default)]
pub struct EchoGateway {
    prompts: Mutex<Vec<String>>,
}

impl EchoGateway {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for EchoGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, CompletionError> {
        let prompt = request
            .new_messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(Completion::from_text(format!("{}: {}", request.model, prompt)))
    }

    fn provider(&self) -> &str {
        "echo"
    }
}

#[derive(Default)]
pub struct VecStore {
    threads: Mutex<HashMap<MemoryKey, Vec<Message>>>,
}

#[async_trait]
impl ConversationStore for VecStore {
    async fn append(&self, key: &MemoryKey, message: Message) -> Result<(), StoreError> {
        self.threads
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn read(&self, key: &MemoryKey) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "test"
    }
}
