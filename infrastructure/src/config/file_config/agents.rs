//! Agent definitions from TOML (`[[agents]]` array)

use duet_domain::{AgentIdentity, AgentRole, ConfigIssue, ConfigIssueCode, DomainError, Model};
use serde::{Deserialize, Serialize};

/// One configured agent.
///
/// # Example
///
/// ```toml
/// [[agents]]
/// name = "generator"
/// role = "generator"          # optional; supplies the default system prompt
/// model = "gpt-4o-mini"
/// temperature = 0.9
///
/// [[agents]]
/// name = "critic"
/// system_prompt = "You are a pragmatic business analyst."
/// model = "gpt-4.1-mini"
/// max_output_tokens = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentEntry {
    pub name: String,
    /// "generator" or "critic"; only used when `system_prompt` is absent.
    pub role: Option<String>,
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl FileAgentEntry {
    /// System prompt: explicit text, else the role default, else the name's
    /// role default, else empty.
    pub fn resolved_system_prompt(&self) -> String {
        if let Some(prompt) = &self.system_prompt {
            return prompt.clone();
        }
        self.role
            .as_deref()
            .unwrap_or(&self.name)
            .parse::<AgentRole>()
            .map(|role| role.default_system_prompt().to_string())
            .unwrap_or_default()
    }

    /// Build the domain identity.
    pub fn to_identity(&self) -> Result<AgentIdentity, DomainError> {
        let model = if self.model.trim().is_empty() {
            Model::default()
        } else {
            Model::from(self.model.trim())
        };
        let mut identity = AgentIdentity::new(&self.name, self.resolved_system_prompt(), model)?;
        if let Some(temperature) = self.temperature {
            identity = identity.with_temperature(temperature)?;
        }
        if let Some(max) = self.max_output_tokens {
            identity = identity.with_max_output_tokens(max);
        }
        Ok(identity)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Err(DomainError::InvalidAgentName(name)) =
            AgentIdentity::new(&self.name, "", Model::default())
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidAgentName { name: name.clone() },
                format!("agents: invalid agent name '{}'", name),
            ));
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyModelName {
                    agent: self.name.clone(),
                },
                format!(
                    "agents.{}: model name is empty, using '{}'",
                    self.name,
                    Model::default()
                ),
            ));
        }
        if let Some(t) = self.temperature
            && (!t.is_finite() || !(0.0..=duet_domain::agent::identity::MAX_TEMPERATURE).contains(&t))
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidTemperature {
                    agent: self.name.clone(),
                },
                format!("agents.{}: temperature {} is out of range 0.0..=2.0", self.name, t),
            ));
        }
        if let Some(role) = &self.role
            && role.parse::<AgentRole>().is_err()
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidEnumValue {
                    field: format!("agents.{}.role", self.name),
                    value: role.clone(),
                    valid_values: vec!["generator".to_string(), "critic".to_string()],
                },
                format!("agents.{}: unknown role '{}'", self.name, role),
            ));
        }
        issues
    }
}

/// Agents used when the configuration defines none: a generator and a critic.
pub fn default_agents() -> Vec<FileAgentEntry> {
    vec![
        FileAgentEntry {
            name: AgentRole::Generator.as_str().to_string(),
            role: Some(AgentRole::Generator.as_str().to_string()),
            model: Model::Gpt4oMini.to_string(),
            ..Default::default()
        },
        FileAgentEntry {
            name: AgentRole::Critic.as_str().to_string(),
            role: Some(AgentRole::Critic.as_str().to_string()),
            model: Model::Gpt41Mini.to_string(),
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_supplies_prompt() {
        let entry = FileAgentEntry {
            name: "writer".to_string(),
            role: Some("generator".to_string()),
            model: "gpt-5".to_string(),
            ..Default::default()
        };
        assert_eq!(
            entry.resolved_system_prompt(),
            AgentRole::Generator.default_system_prompt()
        );
        let identity = entry.to_identity().unwrap();
        assert_eq!(identity.model(), &Model::Gpt5);
    }

    #[test]
    fn test_name_doubles_as_role() {
        let entry = FileAgentEntry {
            name: "critic".to_string(),
            model: "gpt-4.1-mini".to_string(),
            ..Default::default()
        };
        assert_eq!(
            entry.resolved_system_prompt(),
            AgentRole::Critic.default_system_prompt()
        );
    }

    #[test]
    fn test_explicit_prompt_and_sampling() {
        let entry = FileAgentEntry {
            name: "gen".to_string(),
            role: Some("critic".to_string()),
            system_prompt: Some("You draft ideas".to_string()),
            model: "my-local-model".to_string(),
            temperature: Some(0.2),
            max_output_tokens: Some(300),
        };
        let identity = entry.to_identity().unwrap();
        assert_eq!(identity.system_prompt(), "You draft ideas");
        assert_eq!(identity.model(), &Model::Custom("my-local-model".to_string()));
        assert_eq!(identity.temperature(), 0.2);
        assert_eq!(identity.max_output_tokens(), Some(300));
    }

    #[test]
    fn test_validate_reports_issues() {
        let entry = FileAgentEntry {
            name: "bad name".to_string(),
            role: Some("judge".to_string()),
            model: " ".to_string(),
            temperature: Some(3.5),
            ..Default::default()
        };
        let issues = entry.validate();
        assert_eq!(issues.len(), 4);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
        assert!(entry.to_identity().is_err());
    }
}
