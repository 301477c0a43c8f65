//! Scripted session steps from TOML (`[[steps]]` array)

use serde::{Deserialize, Serialize};

/// One `talk_to` call of a scripted session.
///
/// # Example
///
/// ```toml
/// [[steps]]
/// agent = "critic"
/// input = "Which channels are the riskiest and why?"
/// thread = "critic"
/// context_from = "generator"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStep {
    pub agent: String,
    pub input: String,
    /// Thread id; defaults to the agent name.
    pub thread: Option<String>,
    pub context_from: Option<String>,
}

impl FileStep {
    pub fn thread_id(&self) -> &str {
        self.thread.as_deref().unwrap_or(&self.agent)
    }
}

/// A standalone script file holding only `[[steps]]` (and optionally a
/// `[session]` main task).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScript {
    pub session: super::FileSessionConfig,
    pub steps: Vec<FileStep>,
}
