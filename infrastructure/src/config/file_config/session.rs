//! Session configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};

/// # Example
///
/// ```toml
/// [session]
/// main_task = "Develop a go-to-market strategy for a Figma plugin."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Shared goal appended to every context hand-off.
    pub main_task: Option<String>,
}
