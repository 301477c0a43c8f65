//! Conversation memory configuration from TOML (`[memory]` section)

use duet_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend for conversation memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBackend {
    /// Process memory; lost on exit.
    Memory,
    /// Append-only JSONL file, replayed on start.
    Jsonl,
}

impl MemoryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryBackend::Memory => "memory",
            MemoryBackend::Jsonl => "jsonl",
        }
    }
}

/// # Example
///
/// ```toml
/// [memory]
/// backend = "jsonl"
/// path = "~/.local/share/agent-duet/memory.jsonl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    /// "memory" or "jsonl"
    pub backend: String,
    /// JSONL file path; defaults to the user data directory.
    pub path: Option<String>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
        }
    }
}

impl FileMemoryConfig {
    /// Parse the backend name, falling back to in-memory with a warning.
    pub fn parse_backend(&self) -> (MemoryBackend, Vec<ConfigIssue>) {
        match self.backend.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => (MemoryBackend::Memory, vec![]),
            "jsonl" | "file" => (MemoryBackend::Jsonl, vec![]),
            _ => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "memory.backend".to_string(),
                        value: self.backend.clone(),
                        valid_values: vec!["memory".to_string(), "jsonl".to_string()],
                    },
                    format!(
                        "memory.backend: unknown value '{}', falling back to 'memory'",
                        self.backend
                    ),
                );
                (MemoryBackend::Memory, vec![issue])
            }
        }
    }

    /// Path of the JSONL store, with `~` expanded.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|d| d.join("agent-duet").join("memory.jsonl")),
        }
    }
}

pub(super) fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
