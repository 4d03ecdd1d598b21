//! Adapters between the shell and its host platform.
//!
//! The caching agent and the connectivity probe run as tokio tasks and report
//! raw [`PlatformEvent`]s over an unbounded channel; the offline cache manager
//! interprets them.
//!
//! [`PlatformEvent`]: endocalc_types::PlatformEvent

mod connectivity;
mod manifest_agent;

use std::io;

use thiserror::Error;

pub use connectivity::ConnectivityProbe;
pub use manifest_agent::{AgentRecord, ManifestAgentHost, fetch_manifest};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent script must not be empty")]
    EmptyScript,
    #[error("caching agent unavailable: {0}")]
    Unavailable(String),
    #[error("agent cache store: {0}")]
    Store(#[from] io::Error),
    #[error("agent manifest: {0}")]
    Manifest(String),
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRegistration {
    pub scope: String,
    /// Version already controlling the shell, if any.
    pub active: Option<String>,
}

/// Where the caching agent lives.
pub trait AgentHost: Send {
    /// Remove every existing registration. Returns how many were removed.
    fn unregister_all(&mut self) -> Result<usize, AgentError>;

    /// Register `script`. Registering an already-registered script is a no-op
    /// on the host side and returns the existing registration.
    fn register(&mut self, script: &str) -> Result<AgentRegistration, AgentError>;
}

/// Host for platforms without a caching agent. Registration always fails,
/// leaving the shell online-only.
#[derive(Debug, Default)]
pub struct NoAgentHost;

impl AgentHost for NoAgentHost {
    fn unregister_all(&mut self) -> Result<usize, AgentError> {
        Ok(0)
    }

    fn register(&mut self, _script: &str) -> Result<AgentRegistration, AgentError> {
        Err(AgentError::Unavailable(
            "no caching agent on this platform".to_string(),
        ))
    }
}
