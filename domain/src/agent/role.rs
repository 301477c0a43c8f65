//! Well-known agent roles

use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};

/// The roles a duet is usually built from.
///
/// Agents are addressed by free-form names; these roles only provide
/// conventional names and default system prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Produces drafts and revises them.
    Generator,
    /// Reviews drafts and proposes concrete improvements.
    Critic,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Generator => "generator",
            AgentRole::Critic => "critic",
        }
    }

    /// Default system prompt for this role
    pub fn default_system_prompt(&self) -> &'static str {
        match self {
            AgentRole::Generator => PromptTemplate::generator_system(),
            AgentRole::Critic => PromptTemplate::critic_system(),
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generator" | "gen" => Ok(AgentRole::Generator),
            "critic" | "crit" => Ok(AgentRole::Critic),
            other => Err(format!("unknown agent role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("generator".parse::<AgentRole>(), Ok(AgentRole::Generator));
        assert_eq!("CRIT".parse::<AgentRole>(), Ok(AgentRole::Critic));
        assert!("judge".parse::<AgentRole>().is_err());
    }

    #[test]
    fn test_roles_have_distinct_prompts() {
        assert_ne!(
            AgentRole::Generator.default_system_prompt(),
            AgentRole::Critic.default_system_prompt()
        );
    }
}
