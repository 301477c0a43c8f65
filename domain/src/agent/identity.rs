//! Agent identity entity

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Default sampling temperature for new agents.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound accepted by the chat completion providers we target.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// A configured agent: name, system prompt, model and sampling parameters.
///
/// Identities are validated on construction and never change afterwards;
/// re-registering a name creates a new identity.
///
/// # Examples
///
/// ```
/// use duet_domain::{AgentIdentity, Model};
///
/// let identity = AgentIdentity::new("gen", "You draft ideas", Model::Gpt4oMini)
///     .unwrap()
///     .with_max_output_tokens(512);
/// assert_eq!(identity.name(), "gen");
/// assert_eq!(identity.temperature(), 0.7);
/// assert_eq!(identity.max_output_tokens(), Some(512));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    name: String,
    system_prompt: String,
    model: Model,
    temperature: f32,
    max_output_tokens: Option<u32>,
}

impl AgentIdentity {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        model: Model,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidAgentName(name));
        }
        Ok(Self {
            name: trimmed.to_string(),
            system_prompt: system_prompt.into(),
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
        })
    }

    /// Set the sampling temperature, rejecting values outside `0.0..=2.0`.
    pub fn with_temperature(mut self, temperature: f32) -> Result<Self, DomainError> {
        if !temperature.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(DomainError::InvalidTemperature(temperature));
        }
        self.temperature = temperature;
        Ok(self)
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }
}
