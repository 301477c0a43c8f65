//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: available LLM models
//! - [`credential::Credential`]: the provider secret, never printed
//! - [`task::MainTask`]: the shared goal threaded through every hand-off
//! - [`error::DomainError`]: domain-level errors

pub mod credential;
pub mod error;
pub mod model;
pub mod task;
