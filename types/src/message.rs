//! The closed set of messages consumed by the shell's dispatch point.

use std::fmt;

use crate::{CalculatorId, Generation, LoadError, LoadedCalculator, Route};

/// Result of a load task, tagged with the navigation that started it.
pub struct LoadCompletion {
    pub id: CalculatorId,
    pub generation: Generation,
    /// Reload of the current calculator after reconnecting.
    pub resync: bool,
    pub result: Result<LoadedCalculator, LoadError>,
}

impl fmt::Debug for LoadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompletion")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("resync", &self.resync)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

#[derive(Debug)]
pub enum ShellMessage {
    /// The routing address changed to this value.
    RouteChanged(Route),
    /// Connectivity flipped. Only emitted on an actual transition.
    ConnectivityChanged { online: bool },
    /// A new caching-agent version is installed and waiting.
    UpdateAvailable { version: String },
    LoadCompleted(LoadCompletion),
}

impl ShellMessage {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ShellMessage::RouteChanged(_) => "route_changed",
            ShellMessage::ConnectivityChanged { .. } => "connectivity_changed",
            ShellMessage::UpdateAvailable { .. } => "update_available",
            ShellMessage::LoadCompleted(_) => "load_completed",
        }
    }
}

/// The one visible view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Menu,
    CalculatorShown(CalculatorId),
    Error(CalculatorId),
}
