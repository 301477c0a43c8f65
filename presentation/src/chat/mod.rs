//! Interactive chat module
//!
//! Provides a line-editor REPL where each line addresses one agent.

mod repl;

pub use repl::{ChatCommand, ChatRepl};
