//! Test doubles shared by the use case tests.

use crate::ports::completion_gateway::{CompletionError, CompletionGateway, CompletionRequest};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::conversation_store::{ConversationStore, StoreError};
use crate::ports::observer::InvocationObserver;
use async_trait::async_trait;
use duet_domain::{Completion, MemoryKey, Message, TokenUsage};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Owned copy of a [`CompletionRequest`] captured by [`ScriptedGateway`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub credential: String,
    pub history: Vec<Message>,
    pub new_messages: Vec<Message>,
}

impl RecordedRequest {
    /// Content of the last new message, i.e. the prompt of this call.
    pub fn prompt(&self) -> &str {
        self.new_messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Gateway that replays queued results and otherwise echoes the prompt.
pub struct ScriptedGateway {
    queued: Mutex<VecDeque<Result<Completion, CompletionError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, text: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Ok(Completion::from_text(text).with_usage(TokenUsage::new(10, 20))));
    }

    pub fn push_error(&self, error: CompletionError) {
        self.queued.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, CompletionError> {
        let recorded = RecordedRequest {
            system_prompt: request.system_prompt.to_string(),
            model: request.model.to_string(),
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
            credential: request.credential.expose().to_string(),
            history: request.history.to_vec(),
            new_messages: request.new_messages.to_vec(),
        };
        let reply = format!("[{}] reply to: {}", recorded.model, recorded.prompt());
        self.requests.lock().unwrap().push(recorded);

        match self.queued.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(Completion::from_text(reply)),
        }
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

/// Minimal in-memory store for use case tests.
#[derive(Default)]
pub struct MemoryStore {
    threads: tokio::sync::Mutex<HashMap<MemoryKey, Vec<Message>>>,
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn append(&self, key: &MemoryKey, message: Message) -> Result<(), StoreError> {
        self.threads
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn read(&self, key: &MemoryKey) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .threads
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "test"
    }
}

/// Store whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl ConversationStore for BrokenStore {
    async fn append(&self, _key: &MemoryKey, _message: Message) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    async fn read(&self, _key: &MemoryKey) -> Result<Vec<Message>, StoreError> {
        Ok(Vec::new())
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

/// Observer that records every callback as a string.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl InvocationObserver for RecordingObserver {
    fn before_completion(&self, agent: &str, message_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("before:{}:{}", agent, message_count));
    }

    fn after_completion(&self, agent: &str, usage: Option<&TokenUsage>) {
        let total = usage.map(|u| u.total_tokens.to_string());
        self.events.lock().unwrap().push(format!(
            "after:{}:{}",
            agent,
            total.as_deref().unwrap_or("none")
        ));
    }

    fn on_failure(&self, agent: &str, _error: &CompletionError) {
        self.events.lock().unwrap().push(format!("failure:{}", agent));
    }
}

/// Conversation logger that keeps event types in memory.
#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
