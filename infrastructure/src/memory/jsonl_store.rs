//! Durable conversation store backed by one append-only JSONL file.
//!
//! Every appended message becomes one line:
//!
//! ```text
//! {"agent":"gen","generation":1,"thread":"t1","message":{"role":"user","content":"..."}}
//! ```
//!
//! Replacing an agent writes a marker line without thread or message, so the
//! new generation is remembered even if it never receives a message:
//!
//! ```text
//! {"agent":"gen","generation":2}
//! ```
//!
//! The file is replayed into memory on open; reads are served from memory.

use async_trait::async_trait;
use duet_application::{ConversationStore, StoreError};
use duet_domain::{MemoryKey, Message, ThreadId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Serialize, Deserialize)]
struct Record {
    agent: String,
    generation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
}

impl Record {
    fn encode(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[derive(Default)]
struct Replayed {
    threads: HashMap<MemoryKey, Vec<Message>>,
    generations: HashMap<String, u32>,
}

impl Replayed {
    fn note_generation(&mut self, agent: &str, generation: u32) {
        let latest = self.generations.entry(agent.to_string()).or_default();
        *latest = (*latest).max(generation);
    }
}

struct Inner {
    writer: BufWriter<File>,
    state: Replayed,
}

impl Inner {
    fn write_lines(&mut self, lines: &str) -> Result<(), StoreError> {
        self.writer.write_all(lines.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Conversation store that survives process restarts.
///
/// Writes are synchronous and happen under a short std mutex that is never
/// held across an await.
pub struct JsonlConversationStore {
    inner: Mutex<Inner>,
    path: PathBuf,
}

impl JsonlConversationStore {
    /// Open (or create) the store file and replay its records.
    ///
    /// Creates parent directories as needed. A line that is not a valid
    /// record fails the open with [`StoreError::Corrupt`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let state = if path.exists() {
            Self::replay(path)?
        } else {
            Replayed::default()
        };
        let records: usize = state.threads.values().map(Vec::len).sum();
        info!(
            path = %path.display(),
            threads = state.threads.len(),
            records,
            "Conversation store opened"
        );

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                state,
            }),
            path: path.to_path_buf(),
        })
    }

    fn replay(path: &Path) -> Result<Replayed, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut state = Replayed::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                    line: index + 1,
                    message: e.to_string(),
                })?;
            state.note_generation(&record.agent, record.generation);
            match (record.thread, record.message) {
                (Some(thread), Some(message)) => state
                    .threads
                    .entry(MemoryKey::new(record.agent, record.generation, thread))
                    .or_default()
                    .push(message),
                (None, None) => {}
                _ => {
                    return Err(StoreError::Corrupt {
                        line: index + 1,
                        message: "thread and message must appear together".to_string(),
                    });
                }
            }
        }
        Ok(state)
    }

    /// Get the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConversationStore for JsonlConversationStore {
    async fn append(&self, key: &MemoryKey, message: Message) -> Result<(), StoreError> {
        self.append_all(key, vec![message]).await
    }

    async fn read(&self, key: &MemoryKey) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .lock()
            .state
            .threads
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_all(&self, key: &MemoryKey, messages: Vec<Message>) -> Result<(), StoreError> {
        let mut lines = String::new();
        for message in &messages {
            let record = Record {
                agent: key.agent.clone(),
                generation: key.generation,
                thread: Some(key.thread.clone()),
                message: Some(message.clone()),
            };
            lines.push_str(&record.encode()?);
            lines.push('\n');
        }

        let mut inner = self.lock();
        // Memory is updated only after the batch reached the file.
        inner.write_lines(&lines)?;
        debug!(key = %key, count = messages.len(), "Appended to conversation store");
        inner.state.note_generation(&key.agent, key.generation);
        inner
            .state
            .threads
            .entry(key.clone())
            .or_default()
            .extend(messages);
        Ok(())
    }

    fn latest_generation(&self, agent: &str) -> u32 {
        self.lock()
            .state
            .generations
            .get(agent)
            .copied()
            .unwrap_or(0)
    }

    fn start_generation(&self, agent: &str, generation: u32) -> Result<(), StoreError> {
        let record = Record {
            agent: agent.to_string(),
            generation,
            thread: None,
            message: None,
        };
        let mut line = record.encode()?;
        line.push('\n');

        let mut inner = self.lock();
        inner.write_lines(&line)?;
        debug!(agent, generation, "Generation started");
        inner.state.note_generation(agent, generation);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "jsonl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_application::{CompletionError, CompletionGateway, CompletionRequest, Orchestrator};
    use duet_domain::{Completion, Model, Role};
    use std::sync::Arc;

    struct EchoGateway;

    #[async_trait]
    impl CompletionGateway for EchoGateway {
        async fn complete(
            &self,
            request: CompletionRequest<'_>,
        ) -> Result<Completion, CompletionError> {
            let prompt = request
                .new_messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(Completion::from_text(format!("echo {}", prompt)))
        }

        fn provider(&self) -> &str {
            "echo"
        }
    }

    fn orchestrator(store: JsonlConversationStore) -> Orchestrator {
        let mut orchestrator = Orchestrator::new(Arc::new(EchoGateway), Arc::new(store))
            .with_main_task("Plan a launch")
            .unwrap();
        orchestrator.set_credential("sk-test").unwrap();
        orchestrator
    }

    fn key(agent: &str, thread: &str) -> MemoryKey {
        MemoryKey::new(agent, 1, ThreadId::new(thread).unwrap())
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory").join("duet.jsonl");

        {
            let store = JsonlConversationStore::open(&path).unwrap();
            store
                .append_all(
                    &key("gen", "t1"),
                    vec![Message::user("Draft step 1"), Message::assistant("Waitlist")],
                )
                .await
                .unwrap();
            store
                .append(&key("crit", "t2"), Message::user("Review"))
                .await
                .unwrap();
        }

        let store = JsonlConversationStore::open(&path).unwrap();
        let gen_thread = store.read(&key("gen", "t1")).await.unwrap();
        assert_eq!(gen_thread.len(), 2);
        assert_eq!(gen_thread[0].role, Role::User);
        assert_eq!(gen_thread[1].content, "Waitlist");
        assert_eq!(store.read(&key("crit", "t2")).await.unwrap().len(), 1);
        assert!(store.read(&key("gen", "t2")).await.unwrap().is_empty());

        store
            .append(&key("gen", "t1"), Message::user("Draft step 2"))
            .await
            .unwrap();
        assert_eq!(store.read(&key("gen", "t1")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_one_line_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duet.jsonl");
        let store = JsonlConversationStore::open(&path).unwrap();
        store
            .append_all(
                &key("gen", "t1"),
                vec![Message::user("a"), Message::assistant("b")],
            )
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["agent"], "gen");
        assert_eq!(first["generation"], 1);
        assert_eq!(first["thread"], "t1");
        assert_eq!(first["message"]["role"], "user");
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duet.jsonl");
        std::fs::write(
            &path,
            "{\"agent\":\"gen\",\"generation\":1,\"thread\":\"t1\",\"message\":{\"role\":\"user\",\"content\":\"a\"}}\n\nnot json\n",
        )
        .unwrap();

        match JsonlConversationStore::open(&path) {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 3),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("corrupt file should not open"),
        }
    }

    #[tokio::test]
    async fn test_replaced_agent_starts_empty_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duet.jsonl");

        {
            let mut orchestrator = orchestrator(JsonlConversationStore::open(&path).unwrap());
            orchestrator.add_agent_with("gen", "p", Model::Gpt4oMini).unwrap();
            orchestrator.add_agent_with("gen", "p", Model::Gpt4oMini).unwrap();
            orchestrator
                .talk_to("gen", "old run secret", "t1", None)
                .await
                .unwrap();
        }

        let mut orchestrator = orchestrator(JsonlConversationStore::open(&path).unwrap());
        orchestrator.add_agent_with("gen", "p", Model::Gpt4oMini).unwrap();
        assert_eq!(orchestrator.history("gen", "t1").await.unwrap().len(), 2);

        let replaced = orchestrator.add_agent_with("gen", "p", Model::Gpt4oMini).unwrap();
        assert!(replaced);
        assert!(orchestrator.history("gen", "t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_marker_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duet.jsonl");

        {
            let store = JsonlConversationStore::open(&path).unwrap();
            store
                .append(&key("gen", "t1"), Message::user("a"))
                .await
                .unwrap();
            store.start_generation("gen", 3).unwrap();
            assert_eq!(store.latest_generation("gen"), 3);
        }

        let store = JsonlConversationStore::open(&path).unwrap();
        assert_eq!(store.latest_generation("gen"), 3);
        assert_eq!(store.latest_generation("crit"), 0);
        assert_eq!(store.read(&key("gen", "t1")).await.unwrap().len(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let marker: serde_json::Value =
            serde_json::from_str(content.lines().last().unwrap()).unwrap();
        assert_eq!(marker, serde_json::json!({"agent": "gen", "generation": 3}));
    }

    #[test]
    fn test_half_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duet.jsonl");
        std::fs::write(&path, "{\"agent\":\"gen\",\"generation\":1,\"thread\":\"t1\"}\n").unwrap();

        assert!(matches!(
            JsonlConversationStore::open(&path),
            Err(StoreError::Corrupt { line: 1, .. })
        ));
    }
}
