//! Prompt domain
//!
//! Default system prompts and the context hand-off wrapper.

mod context;
mod template;

pub use context::ContextWrapper;
pub use template::PromptTemplate;
