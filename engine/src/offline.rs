//! Offline cache manager: caching-agent registration, update detection and
//! connectivity tracking.
//!
//! This is the only writer of [`CacheState`]. It turns raw platform events into
//! shell messages, suppressing repeats: identical connectivity reports produce
//! nothing, and a given agent version is announced at most once.

use std::collections::HashSet;

use endocalc_types::{AgentEvent, AgentState, CacheState, PlatformEvent, ShellMessage};

use crate::platform::{AgentError, AgentHost};

/// The dismissible "new version" banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotification {
    pub version: String,
}

impl UpdateNotification {
    #[must_use]
    pub fn message(&self) -> &'static str {
        "New version available!"
    }
}

#[derive(Debug)]
pub struct OfflineCacheManager {
    state: CacheState,
    script: String,
    dev_mode: bool,
    /// Version currently controlling the shell.
    controller: Option<String>,
    /// Versions already announced; never announced again.
    announced: HashSet<String>,
    notification: Option<UpdateNotification>,
}

impl OfflineCacheManager {
    #[must_use]
    pub fn new(script: impl Into<String>, dev_mode: bool) -> Self {
        Self {
            state: CacheState::default(),
            script: script.into(),
            dev_mode,
            controller: None,
            announced: HashSet::new(),
            notification: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> CacheState {
        self.state
    }

    #[must_use]
    pub fn notification(&self) -> Option<&UpdateNotification> {
        self.notification.as_ref()
    }

    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    #[must_use]
    pub fn status_text(&self) -> &'static str {
        if self.state.online {
            "Online"
        } else {
            "Offline - Using Cached Data"
        }
    }

    /// Register the caching agent. Only the first call does anything; in
    /// development mode leftover registrations are removed first.
    pub fn start(&mut self, host: &mut dyn AgentHost) -> Result<(), AgentError> {
        if self.state.registered {
            tracing::debug!("Caching agent already registered");
            return Ok(());
        }

        if self.dev_mode {
            let removed = host.unregister_all()?;
            tracing::info!("Development mode: removed {removed} existing agent registration(s)");
        }

        match host.register(&self.script) {
            Ok(registration) => {
                tracing::info!(
                    "Caching agent registered successfully: {}",
                    registration.scope
                );
                self.state.registered = true;
                self.controller = registration.active;
                Ok(())
            }
            Err(err) => {
                tracing::error!("Caching agent registration failed: {err}");
                Err(err)
            }
        }
    }

    /// Fold one platform event into the cache state.
    pub fn handle(&mut self, event: PlatformEvent) -> Option<ShellMessage> {
        match event {
            PlatformEvent::Connectivity { online } => self.set_online(online),
            PlatformEvent::Agent(event) => self.on_agent(event),
        }
    }

    fn set_online(&mut self, online: bool) -> Option<ShellMessage> {
        if self.state.online == online {
            return None;
        }
        self.state.online = online;
        tracing::info!("Connection status: {}", self.status_text());
        Some(ShellMessage::ConnectivityChanged { online })
    }

    fn on_agent(&mut self, event: AgentEvent) -> Option<ShellMessage> {
        match event {
            AgentEvent::UpdateFound { version } => {
                tracing::info!("Caching agent update found: {version}");
                None
            }
            AgentEvent::StateChanged {
                version,
                state: AgentState::Installed,
            } => self.on_installed(version),
            AgentEvent::StateChanged { version, state } => {
                tracing::debug!("Caching agent {version} is {}", state.as_str());
                None
            }
            AgentEvent::ControllerChange { version } => {
                tracing::info!("Caching agent {version} now controls the shell");
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|notification| notification.version == version)
                {
                    self.clear_notification();
                }
                self.controller = Some(version);
                None
            }
        }
    }

    fn on_installed(&mut self, version: String) -> Option<ShellMessage> {
        let Some(controller) = &self.controller else {
            tracing::info!("Caching agent {version} installed for the first time");
            return None;
        };
        if *controller == version {
            return None;
        }
        if self.notification.is_some() || self.announced.contains(&version) {
            tracing::debug!("Update {version} already announced");
            return None;
        }

        self.announced.insert(version.clone());
        self.state.update_available = true;
        self.notification = Some(UpdateNotification {
            version: version.clone(),
        });
        Some(ShellMessage::UpdateAvailable { version })
    }

    /// User dismissed the banner. A future version may be announced again.
    pub fn dismiss(&mut self) {
        self.clear_notification();
    }

    /// User chose the banner's reload action.
    pub fn refresh(&mut self) {
        self.clear_notification();
    }

    fn clear_notification(&mut self) {
        self.notification = None;
        self.state.update_available = false;
    }
}
