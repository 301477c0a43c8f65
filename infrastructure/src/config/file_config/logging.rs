//! Logging configuration from TOML (`[logging]` section)

use super::memory::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// # Example
///
/// ```toml
/// [logging]
/// conversation_log = true
/// dir = "~/.cache/agent-duet/logs"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a JSONL transcript of every turn.
    pub conversation_log: bool,
    /// Directory for log files; defaults to the user cache directory.
    pub dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        match &self.dir {
            Some(dir) => Some(expand_home(dir)),
            None => dirs::cache_dir().map(|d| d.join("agent-duet").join("logs")),
        }
    }
}
