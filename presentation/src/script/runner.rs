//! Scripted session runner
//!
//! Replays a fixed list of turns against an [`Orchestrator`], the way a
//! person would drive it by hand.

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use duet_application::{Orchestrator, OrchestratorError};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// One `talk_to` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub agent: String,
    pub input: String,
    pub thread: String,
    pub context_from: Option<String>,
}

impl ScriptStep {
    /// Step on the agent's own thread, without context.
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            thread: agent.clone(),
            agent,
            input: input.into(),
            context_from: None,
        }
    }

    pub fn on_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    pub fn with_context_from(mut self, agent: impl Into<String>) -> Self {
        self.context_from = Some(agent.into());
        self
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: usize,
    pub agent: String,
    pub thread: String,
    pub context_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A step failed and the run stopped there.
#[derive(Error, Debug)]
#[error("step {step} ({agent}) failed")]
pub struct ScriptError {
    pub step: usize,
    pub agent: String,
    #[source]
    pub source: OrchestratorError,
    /// Steps that ran before the failure.
    pub completed: Vec<StepResult>,
}

/// Runs [`ScriptStep`]s in order.
pub struct ScriptRunner<'a> {
    orchestrator: &'a Orchestrator,
    keep_going: bool,
    echo: Option<OutputFormat>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(orchestrator: &'a Orchestrator) -> Self {
        Self {
            orchestrator,
            keep_going: false,
            echo: None,
        }
    }

    /// Continue after a failed step instead of stopping.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Print each reply as it arrives (text format only).
    pub fn echo(mut self, format: OutputFormat) -> Self {
        self.echo = Some(format);
        self
    }

    /// Execute every step.
    ///
    /// Stops at the first failure unless `keep_going` is set, in which case
    /// failures are recorded in the returned results.
    pub async fn run(&self, steps: &[ScriptStep]) -> Result<Vec<StepResult>, ScriptError> {
        let mut results = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            info!(step = number, agent = %step.agent, thread = %step.thread, "Running step");

            let outcome = self
                .orchestrator
                .talk_to(
                    &step.agent,
                    &step.input,
                    &step.thread,
                    step.context_from.as_deref(),
                )
                .await;

            let mut result = StepResult {
                step: number,
                agent: step.agent.clone(),
                thread: step.thread.clone(),
                context_from: step.context_from.clone(),
                reply: None,
                error: None,
            };

            match outcome {
                Ok(reply) => {
                    if self.echo == Some(OutputFormat::Text) {
                        println!(
                            "{}",
                            ConsoleFormatter::reply(
                                &step.agent,
                                &step.thread,
                                step.context_from.as_deref(),
                                &reply
                            )
                        );
                    }
                    result.reply = Some(reply);
                }
                Err(e) if self.keep_going => {
                    warn!(step = number, "Step failed, continuing: {}", e);
                    if self.echo == Some(OutputFormat::Text) {
                        eprintln!("{}", ConsoleFormatter::error(&e));
                    }
                    result.error = Some(e.to_string());
                }
                Err(e) => {
                    return Err(ScriptError {
                        step: number,
                        agent: step.agent.clone(),
                        source: e,
                        completed: results,
                    });
                }
            }
            results.push(result);
        }

        Ok(results)
    }
}
