//! Agent domain.
//!
//! - [`identity::AgentIdentity`]: a configured agent: prompt, model and sampling
//! - [`role::AgentRole`]: the two well-known roles (generator, critic)

pub mod identity;
pub mod role;
