//! Presentation layer for agent-duet
//!
//! This crate contains CLI definitions, output formatting,
//! the scripted-session runner and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod script;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use chat::{ChatCommand, ChatRepl};
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use script::{ScriptError, ScriptRunner, ScriptStep, StepResult};
