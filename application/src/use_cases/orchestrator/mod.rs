//! Orchestrator use case.
//!
//! The [`Orchestrator`] is the single entry point of the duet. It owns the
//! main task, the registry of named [`AgentSession`]s and the cache of each
//! agent's most recent reply, which is what gets handed to the other agent
//! when a call names it as `context_from`.
//!
//! # Gating
//!
//! ```text
//! set_credential ──► add_agent ──┐
//!                                 ├──► talk_to
//! set_main_task ─────────────────┘
//! ```
//!
//! Round selection is left to the caller: every `talk_to` is one explicit turn.

mod error;

pub use error::OrchestratorError;

use crate::ports::completion_gateway::CompletionGateway;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::conversation_store::ConversationStore;
use crate::ports::observer::{InvocationObserver, TracingObserver};
use crate::use_cases::agent_session::{AgentSession, SessionError};
use duet_domain::util::preview;
use duet_domain::{
    AgentIdentity, ContextWrapper, Credential, InvocationState, MainTask, Message, Model, ThreadId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Coordinates named agent sessions and the context hand-off between them.
///
/// Each orchestrator owns all of its state; two instances never share agents,
/// caches or credentials.
pub struct Orchestrator {
    gateway: Arc<dyn CompletionGateway>,
    store: Arc<dyn ConversationStore>,
    observer: Arc<dyn InvocationObserver>,
    conversation_logger: Arc<dyn ConversationLogger>,
    main_task: Option<MainTask>,
    credential: Option<Credential>,
    agents: HashMap<String, AgentSession>,
    last_outputs: Mutex<HashMap<String, String>>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn CompletionGateway>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            gateway,
            store,
            observer: Arc::new(TracingObserver),
            conversation_logger: Arc::new(NoConversationLogger),
            main_task: None,
            credential: None,
            agents: HashMap::new(),
            last_outputs: Mutex::new(HashMap::new()),
        }
    }

    /// Set the main task at construction time.
    pub fn with_main_task(mut self, text: impl Into<String>) -> Result<Self, OrchestratorError> {
        self.set_main_task(text)?;
        Ok(self)
    }

    /// Replace the invocation observer used by agents added afterwards.
    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    // ==================== Setup ====================

    /// Store the main task. It can be set only once per orchestrator.
    pub fn set_main_task(&mut self, text: impl Into<String>) -> Result<(), OrchestratorError> {
        if self.main_task.is_some() {
            return Err(OrchestratorError::configuration("main task already set"));
        }
        let task = MainTask::new(text)
            .map_err(|_| OrchestratorError::configuration("main task cannot be empty"))?;
        info!("Main task set: {}", preview(task.as_str(), 120));
        self.main_task = Some(task);
        Ok(())
    }

    /// Store the credential used by agents added from now on.
    ///
    /// Agents registered earlier keep the credential they were created with.
    pub fn set_credential(&mut self, secret: impl Into<String>) -> Result<(), OrchestratorError> {
        let credential = Credential::new(secret)
            .map_err(|_| OrchestratorError::configuration("credential cannot be empty"))?;
        self.credential = Some(credential);
        debug!("Credential set");
        Ok(())
    }

    /// Register an agent under its identity's name.
    ///
    /// Re-adding an existing name replaces the old session: its memory and
    /// its cached last output are discarded. The replacement takes a
    /// generation the store has never seen, so the reset also holds for
    /// durable stores reopened from an earlier run; a store that cannot
    /// record it fails the call with an invocation error. Returns `true`
    /// when an agent was replaced.
    pub fn add_agent(&mut self, identity: AgentIdentity) -> Result<bool, OrchestratorError> {
        let credential = self
            .credential
            .clone()
            .ok_or_else(|| OrchestratorError::configuration("credential not set"))?;

        let name = identity.name().to_string();
        let persisted = self.store.latest_generation(&name);
        let generation = match self.agents.get(&name) {
            Some(previous) => {
                let next = previous.generation().max(persisted) + 1;
                self.store
                    .start_generation(&name, next)
                    .map_err(|e| OrchestratorError::Invocation {
                        agent: name.clone(),
                        source: SessionError::Store(e),
                    })?;
                next
            }
            // First registration resumes the newest stored generation.
            None => persisted.max(1),
        };

        let session = AgentSession::new(
            identity,
            generation,
            credential,
            self.gateway.clone(),
            self.store.clone(),
        )
        .with_observer(self.observer.clone());

        info!(
            agent = %name,
            model = %session.identity().model(),
            generation,
            "Agent registered"
        );

        let replaced = self.agents.insert(name.clone(), session).is_some();
        if replaced {
            warn!(agent = %name, "Agent replaced; previous memory discarded");
            self.outputs().remove(&name);
        }
        Ok(replaced)
    }

    /// Register an agent with the default temperature and no output limit.
    pub fn add_agent_with(
        &mut self,
        name: &str,
        system_prompt: &str,
        model: Model,
    ) -> Result<bool, OrchestratorError> {
        if self.credential.is_none() {
            return Err(OrchestratorError::configuration("credential not set"));
        }
        let identity = AgentIdentity::new(name, system_prompt, model)
            .map_err(|e| OrchestratorError::configuration(e.to_string()))?;
        self.add_agent(identity)
    }

    // ==================== Turn ====================

    /// Send `input_text` to `agent_name` within `thread_id`.
    ///
    /// When `context_from` names an agent with a cached reply, that reply is
    /// wrapped together with `input_text` and the main task; otherwise
    /// `input_text` is sent unchanged. The reply is cached as the agent's
    /// last output only when the call succeeds.
    pub async fn talk_to(
        &self,
        agent_name: &str,
        input_text: &str,
        thread_id: &str,
        context_from: Option<&str>,
    ) -> Result<String, OrchestratorError> {
        // An unset main task is reported before any agent lookup.
        let main_task = self
            .main_task
            .as_ref()
            .ok_or_else(|| OrchestratorError::configuration("main task not set"))?;
        let session = self
            .agents
            .get(agent_name)
            .ok_or_else(|| OrchestratorError::NotFound(agent_name.to_string()))?;
        let thread = ThreadId::new(thread_id)
            .map_err(|e| OrchestratorError::configuration(e.to_string()))?;

        let prompt = self.compose_input(main_task, input_text, context_from);
        info!(
            agent = agent_name,
            thread = %thread,
            context_from = context_from.unwrap_or("-"),
            "talk_to: {}",
            preview(input_text, 80)
        );
        self.conversation_logger.log(ConversationEvent::agent_request(
            agent_name,
            thread.as_str(),
            context_from,
            &prompt,
        ));

        let state = InvocationState::user(agent_name, prompt);
        let state = match session.invoke(state, &thread).await {
            Ok(state) => state,
            Err(e) => {
                warn!(agent = agent_name, thread = %thread, "Invocation failed: {}", e);
                self.conversation_logger.log(ConversationEvent::agent_error(
                    agent_name,
                    thread.as_str(),
                    &e.to_string(),
                ));
                return Err(OrchestratorError::from_session(agent_name, e));
            }
        };

        let (text, usage) = match state.response() {
            Some(message) => (message.content.clone(), message.usage),
            None => (state.final_text().unwrap_or_default().to_string(), None),
        };

        self.conversation_logger.log(ConversationEvent::agent_response(
            agent_name,
            thread.as_str(),
            usage.as_ref(),
            &text,
        ));
        self.outputs().insert(agent_name.to_string(), text.clone());
        debug!(agent = agent_name, bytes = text.len(), "Last output cached");

        Ok(text)
    }

    fn compose_input(
        &self,
        main_task: &MainTask,
        input_text: &str,
        context_from: Option<&str>,
    ) -> String {
        let Some(source) = context_from else {
            return input_text.to_string();
        };
        match self.outputs().get(source) {
            Some(context) => ContextWrapper::wrap(main_task, source, context, Some(input_text)),
            None => {
                debug!(
                    context_from = source,
                    "No cached output to hand off; sending input unwrapped"
                );
                input_text.to_string()
            }
        }
    }

    fn outputs(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.last_outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Introspection ====================

    pub fn main_task(&self) -> Option<&MainTask> {
        self.main_task.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Registered agent names, sorted.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn identity(&self, name: &str) -> Option<&AgentIdentity> {
        self.agents.get(name).map(|s| s.identity())
    }

    /// Most recent reply of `name`, across all threads.
    pub fn last_output(&self, name: &str) -> Option<String> {
        self.outputs().get(name).cloned()
    }

    /// Stored messages of one agent thread, oldest first.
    pub async fn history(
        &self,
        agent_name: &str,
        thread_id: &str,
    ) -> Result<Vec<Message>, OrchestratorError> {
        let session = self
            .agents
            .get(agent_name)
            .ok_or_else(|| OrchestratorError::NotFound(agent_name.to_string()))?;
        let thread = ThreadId::new(thread_id)
            .map_err(|e| OrchestratorError::configuration(e.to_string()))?;
        session
            .history(&thread)
            .await
            .map_err(|e| OrchestratorError::from_session(agent_name, e.into()))
    }
}
