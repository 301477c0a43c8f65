//! Console output formatter for duet turns

use crate::script::StepResult;
use colored::Colorize;
use duet_application::OrchestratorError;
use duet_domain::{Message, Role};
use std::error::Error as _;

/// Formats replies, histories and errors for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed once per session
    pub fn session_header(main_task: &str, agents: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Agent Duet"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Main task:".cyan().bold(), main_task));
        output.push_str(&format!("{} {}\n", "Agents:".cyan().bold(), agents.join(", ")));
        output
    }

    /// One agent reply
    pub fn reply(agent: &str, thread: &str, context_from: Option<&str>, text: &str) -> String {
        let title = match context_from {
            Some(from) => format!("── {} [{}] ← {} ──", agent, thread, from),
            None => format!("── {} [{}] ──", agent, thread),
        };
        format!("\n{}\n{}\n", title.yellow().bold(), text.trim_end())
    }

    /// A failed turn, with its cause chain
    pub fn error(error: &OrchestratorError) -> String {
        let mut output = format!("{} {}", "Error:".red().bold(), error);
        let mut source = error.source();
        while let Some(cause) = source {
            output.push_str(&format!("\n  {} {}", "caused by:".dimmed(), cause));
            source = cause.source();
        }
        if error.is_retryable() {
            output.push_str(&format!("\n  {}", "(transient; try again)".dimmed()));
        }
        output
    }

    /// Format step results as JSON
    pub fn results_json(results: &[StepResult]) -> String {
        serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
    }

    /// Stored messages of one thread
    pub fn history(agent: &str, thread: &str, messages: &[Message]) -> String {
        if messages.is_empty() {
            return format!("{} {} [{}]", "No messages in".dimmed(), agent, thread);
        }
        let mut output = Self::section_header(&format!("{} [{}]", agent, thread));
        for message in messages {
            let label = match message.role {
                Role::System => "system".dimmed(),
                Role::User => "user".cyan().bold(),
                Role::Assistant => "assistant".green().bold(),
            };
            output.push_str(&format!(
                "{}\n{}\n\n",
                label,
                Self::indent(message.content.trim_end(), "  ")
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
