//! Offline cache state and the raw platform events that drive it.

/// Process-wide offline state. Mutated only by the offline cache manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheState {
    pub registered: bool,
    pub online: bool,
    pub update_available: bool,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            registered: false,
            online: true,
            update_available: false,
        }
    }
}

/// Lifecycle state of a caching-agent version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl AgentState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentState::Installing => "installing",
            AgentState::Installed => "installed",
            AgentState::Activating => "activating",
            AgentState::Activated => "activated",
            AgentState::Redundant => "redundant",
        }
    }
}

/// Lifecycle notifications from the caching agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A version began installing (first install or update).
    UpdateFound { version: String },
    StateChanged { version: String, state: AgentState },
    /// `version` now controls the shell.
    ControllerChange { version: String },
}

/// Raw input from platform adapters, before the cache manager interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Agent(AgentEvent),
    Connectivity { online: bool },
}
