//! Configuration issues detected while validating user configuration.
//!
//! Validation never aborts on the first problem: callers collect every
//! [`ConfigIssue`] and decide whether any of them is fatal.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A model name was configured but left empty.
    EmptyModelName { agent: String },
    /// Two `[[agents]]` entries share the same name.
    DuplicateAgent { name: String },
    /// An agent name is empty or contains whitespace.
    InvalidAgentName { name: String },
    /// A temperature lies outside the accepted range.
    InvalidTemperature { agent: String },
    /// A field holds a value outside its accepted set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A script step references an agent that is not configured.
    UnknownAgentReference { step: usize, agent: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
