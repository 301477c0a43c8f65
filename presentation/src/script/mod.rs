//! Scripted (non-interactive) sessions

mod runner;

pub use runner::{ScriptError, ScriptRunner, ScriptStep, StepResult};
