//! Prompt templates for the generator / critic duet

/// Default prompt texts.
///
/// These are the fallbacks used when an agent is configured by role without
/// an explicit system prompt.
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the generator role
    pub fn generator_system() -> &'static str {
        r#"You are a creative strategist. Your task is to generate ideas and produce draft documents.
Write concrete, well-structured drafts. When you receive feedback, revise the draft itself
instead of appending notes, and keep everything you were not asked to change."#
    }

    /// System prompt for the critic role
    pub fn critic_system() -> &'static str {
        r#"You are a pragmatic analyst. Your task is to critically evaluate drafts, identify risks
and weak assumptions, and propose concrete, measurable improvements.
Be specific: point to the exact part of the draft you are criticising and say what should replace it."#
    }

    /// Instruction used when a hand-off carries context but no explicit instruction
    pub fn default_instruction() -> &'static str {
        "Continue the work using the context above."
    }
}
