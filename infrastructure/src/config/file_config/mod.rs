//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain types on demand.

mod agents;
mod logging;
mod memory;
mod providers;
mod session;
mod steps;

pub use agents::{FileAgentEntry, default_agents};
pub use logging::FileLoggingConfig;
pub use memory::{FileMemoryConfig, MemoryBackend};
pub use providers::{FileOpenAiConfig, FileProvidersConfig};
pub use session::FileSessionConfig;
pub use steps::{FileScript, FileStep};

use duet_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Main task of the session
    pub session: FileSessionConfig,
    /// Completion provider settings
    pub providers: FileProvidersConfig,
    /// Agents to register, in order
    pub agents: Vec<FileAgentEntry>,
    /// Conversation memory backend
    pub memory: FileMemoryConfig,
    /// Log file settings
    pub logging: FileLoggingConfig,
    /// Scripted session for `run`
    pub steps: Vec<FileStep>,
}

impl FileConfig {
    /// Agents to register: the configured ones, or the default duet.
    pub fn effective_agents(&self) -> Vec<FileAgentEntry> {
        if self.agents.is_empty() {
            default_agents()
        } else {
            self.agents.clone()
        }
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// It checks:
    /// 1. Each agent entry (name, model, temperature, role)
    /// 2. Duplicate agent names
    /// 3. The memory backend name
    /// 4. Script steps that reference unknown agents
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Agent entries
        let agents = self.effective_agents();
        for entry in &agents {
            issues.extend(entry.validate());
        }

        // 2. Duplicates. Later entries replace earlier ones at registration.
        let mut seen = HashSet::new();
        for entry in &agents {
            if !seen.insert(entry.name.trim()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateAgent {
                        name: entry.name.clone(),
                    },
                    format!(
                        "agents: '{}' is defined more than once; the last definition wins",
                        entry.name
                    ),
                ));
            }
        }

        // 3. Memory backend
        issues.extend(self.memory.parse_backend().1);

        // 4. Step references
        issues.extend(validate_steps(&self.steps, &seen));

        issues
    }
}

/// Check that every step addresses a known agent.
pub fn validate_steps(steps: &[FileStep], agents: &HashSet<&str>) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        let number = index + 1;
        if !agents.contains(step.agent.trim()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownAgentReference {
                    step: number,
                    agent: step.agent.clone(),
                },
                format!("steps[{}]: unknown agent '{}'", number, step.agent),
            ));
        }
        if let Some(from) = &step.context_from
            && !agents.contains(from.trim())
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnknownAgentReference {
                    step: number,
                    agent: from.clone(),
                },
                format!(
                    "steps[{}]: context_from '{}' is not a configured agent; input is sent unwrapped",
                    number, from
                ),
            ));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_domain::Model;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[session]
main_task = "Plan a launch"

[providers.openai]
api_key_env = "MY_KEY"
timeout_secs = 30

[[agents]]
name = "gen"
system_prompt = "You draft ideas"
model = "model-x"

[[agents]]
name = "crit"
role = "critic"
model = "gpt-4.1-mini"
temperature = 0.2

[memory]
backend = "jsonl"
path = "/tmp/duet.jsonl"

[logging]
conversation_log = true

[[steps]]
agent = "gen"
input = "Draft step 1"
thread = "t1"

[[steps]]
agent = "crit"
input = "Review this"
thread = "t2"
context_from = "gen"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.main_task.as_deref(), Some("Plan a launch"));
        assert_eq!(config.providers.openai.api_key_env, "MY_KEY");
        assert_eq!(config.providers.openai.timeout_secs, 30);
        assert_eq!(config.providers.openai.base_url, "https://api.openai.com");
        assert_eq!(config.agents.len(), 2);
        assert_eq!(
            config.agents[0].to_identity().unwrap().model(),
            &Model::Custom("model-x".to_string())
        );
        assert_eq!(config.memory.parse_backend().0, MemoryBackend::Jsonl);
        assert!(config.logging.conversation_log);
        assert_eq!(config.steps[1].context_from.as_deref(), Some("gen"));
        assert_eq!(config.steps[1].thread_id(), "t2");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.session.main_task.is_none());
        assert!(config.agents.is_empty());
        assert!(config.steps.is_empty());
        assert!(!config.logging.conversation_log);
        assert_eq!(config.providers.openai.api_key_env, "OPENAI_API_KEY");

        let names: Vec<_> = config
            .effective_agents()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["generator", "critic"]);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_duplicates_and_unknown_steps() {
        let toml_str = r#"
[[agents]]
name = "gen"
model = "gpt-5"

[[agents]]
name = "gen"
model = "gpt-5-mini"

[[steps]]
agent = "critic"
input = "Review"
context_from = "nobody"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::DuplicateAgent { name } if name == "gen"
        )));
        assert!(issues.iter().any(|i| i.is_error()
            && matches!(
                &i.code,
                ConfigIssueCode::UnknownAgentReference { step: 1, agent } if agent == "critic"
            )));
        assert!(issues.iter().any(|i| !i.is_error()
            && matches!(
                &i.code,
                ConfigIssueCode::UnknownAgentReference { agent, .. } if agent == "nobody"
            )));
    }

    #[test]
    fn test_step_thread_defaults_to_agent() {
        let step = FileStep {
            agent: "generator".to_string(),
            input: "Draft".to_string(),
            ..Default::default()
        };
        assert_eq!(step.thread_id(), "generator");
    }
}
