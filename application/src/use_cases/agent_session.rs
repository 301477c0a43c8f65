//! Agent session use case.
//!
//! An [`AgentSession`] binds one [`AgentIdentity`] to the completion gateway,
//! the credential it was registered with, and a thread-partitioned view of
//! the conversation store.

use crate::ports::completion_gateway::{CompletionError, CompletionGateway, CompletionRequest};
use crate::ports::conversation_store::{ConversationStore, StoreError};
use crate::ports::observer::{InvocationObserver, NoObserver};
use duet_domain::{AgentIdentity, Credential, InvocationState, MemoryKey, Message, ThreadId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while invoking an agent session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Conversation store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SessionError::Completion(e) if e.is_auth_failure())
    }
}

/// Runtime binding of one agent identity to a live completion capability and
/// its conversation memory.
///
/// Each call to [`invoke`](Self::invoke) holds the lock of its thread for the
/// whole read → complete → append sequence, so concurrent calls on different
/// threads proceed independently while calls on the same thread are
/// serialized. A thread's lock lives only while some call holds or awaits it.
pub struct AgentSession {
    identity: AgentIdentity,
    generation: u32,
    credential: Credential,
    gateway: Arc<dyn CompletionGateway>,
    store: Arc<dyn ConversationStore>,
    observer: Arc<dyn InvocationObserver>,
    thread_locks: Mutex<HashMap<ThreadId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AgentSession {
    pub fn new(
        identity: AgentIdentity,
        generation: u32,
        credential: Credential,
        gateway: Arc<dyn CompletionGateway>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            identity,
            generation,
            credential,
            gateway,
            store,
            observer: Arc::new(NoObserver),
            thread_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Registration generation of this session's memory in the store.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn memory_key(&self, thread: &ThreadId) -> MemoryKey {
        MemoryKey::new(self.identity.name(), self.generation, thread.clone())
    }

    /// Stored messages of one thread, oldest first.
    pub async fn history(&self, thread: &ThreadId) -> Result<Vec<Message>, StoreError> {
        self.store.read(&self.memory_key(thread)).await
    }

    /// Send `state` to the model within `thread` and return it with the
    /// response appended as its final message.
    ///
    /// On success the thread grows by the state's messages followed by the
    /// response. On failure nothing is appended.
    pub async fn invoke(
        &self,
        state: InvocationState,
        thread: &ThreadId,
    ) -> Result<InvocationState, SessionError> {
        let lock = self.thread_lock(thread);
        let result = {
            let _guard = lock.lock().await;
            self.invoke_locked(state, thread).await
        };
        self.release_thread_lock(thread, lock);
        result
    }

    async fn invoke_locked(
        &self,
        mut state: InvocationState,
        thread: &ThreadId,
    ) -> Result<InvocationState, SessionError> {
        let key = self.memory_key(thread);
        let history = self.store.read(&key).await?;
        let agent = self.identity.name();

        let request = CompletionRequest {
            system_prompt: self.identity.system_prompt(),
            model: self.identity.model(),
            temperature: self.identity.temperature(),
            max_output_tokens: self.identity.max_output_tokens(),
            credential: &self.credential,
            history: &history,
            new_messages: &state.messages,
        };

        self.observer
            .before_completion(agent, request.message_count());
        debug!(
            agent,
            thread = %thread,
            provider = self.gateway.provider(),
            model = %self.identity.model(),
            "Requesting completion"
        );

        let completion = match self.gateway.complete(request).await {
            Ok(completion) => completion,
            Err(e) => {
                self.observer.on_failure(agent, &e);
                return Err(e.into());
            }
        };
        self.observer
            .after_completion(agent, completion.usage.as_ref());

        let response = completion.into_message();
        let mut records = state.messages.clone();
        records.push(response.clone());
        self.store.append_all(&key, records).await?;

        state.messages.push(response);
        Ok(state)
    }

    fn thread_lock(&self, thread: &ThreadId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .thread_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(thread.clone()).or_default().clone()
    }

    /// Drop a thread's lock entry once no call holds or awaits it.
    fn release_thread_lock(&self, thread: &ThreadId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .thread_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks
            .get(thread)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(thread);
        }
    }
}
