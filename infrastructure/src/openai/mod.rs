//! OpenAI-compatible completion provider
//!
//! Talks to any endpoint that implements `POST /v1/chat/completions`.

mod gateway;
mod wire;

pub use gateway::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, OpenAiCompletionGateway};
