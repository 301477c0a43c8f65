//! Context hand-off wrapper

use super::template::PromptTemplate;
use crate::core::task::MainTask;

/// Merges another agent's output, the new instruction and the main task into
/// one prompt.
///
/// Pure string formatting: identical inputs always produce byte-identical
/// output.
///
/// # Examples
///
/// ```
/// use duet_domain::{ContextWrapper, MainTask};
///
/// let task = MainTask::new("Plan a launch").unwrap();
/// let prompt = ContextWrapper::wrap(&task, "gen", "Step 1: teaser", Some("Review this"));
/// assert!(prompt.contains("--- The context from the agent 'gen' ---"));
/// assert!(prompt.contains("Step 1: teaser"));
/// assert!(prompt.ends_with("Don't forget about the main goal: Plan a launch"));
/// ```
pub struct ContextWrapper;

impl ContextWrapper {
    /// Closing rule of the context section.
    pub const CONTEXT_END: &'static str = "------------------------------------";

    /// Wrap `context_text` produced by `source_agent` for the next agent.
    pub fn wrap(
        main_task: &MainTask,
        source_agent: &str,
        context_text: &str,
        instruction: Option<&str>,
    ) -> String {
        Self::render(main_task.as_str(), source_agent, context_text, instruction)
    }

    /// Same as [`wrap`](Self::wrap) for a raw main task string.
    pub fn render(
        main_task: &str,
        source_agent: &str,
        context_text: &str,
        instruction: Option<&str>,
    ) -> String {
        let instruction = instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(PromptTemplate::default_instruction());

        // Context is embedded byte for byte; the closing rule only needs its own line.
        let separator = if context_text.ends_with('\n') { "" } else { "\n" };

        format!(
            "--- The context from the agent '{source}' ---\n\
             {context}{separator}\
             {end}\n\
             \n\
             YOUR TASK:\n\
             {instruction}\n\
             \n\
             Don't forget about the main goal: {task}",
            source = source_agent,
            context = context_text,
            end = Self::CONTEXT_END,
            instruction = instruction,
            task = main_task,
        )
    }
}
