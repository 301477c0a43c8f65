//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid agent name: {0}")]
    InvalidAgentName(String),

    #[error("Invalid temperature {0}: expected a value between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid thread id: {0}")]
    InvalidThreadId(String),

    #[error("Main task cannot be empty")]
    EmptyMainTask,

    #[error("Credential cannot be empty")]
    EmptyCredential,
}
