//! A caching agent driven by a version manifest.
//!
//! The agent's opaque store is a single JSON record holding the active
//! version and, at most, one installed version waiting to take over. A waiting
//! version becomes active at the next registration, never mid-session.
//! Without a manifest URL the agent installs the bundled version once.

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use endocalc_types::{AgentEvent, AgentState, PlatformEvent};

use super::{AgentError, AgentHost, AgentRegistration};
use crate::config::data_dir;

const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub script: String,
    pub active: Option<String>,
    pub waiting: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: String,
}

pub async fn fetch_manifest(client: &Client, url: &Url) -> Result<String, AgentError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|err| AgentError::Manifest(err.to_string()))?;
    let manifest: Manifest = response
        .json()
        .await
        .map_err(|err| AgentError::Manifest(err.to_string()))?;
    let version = manifest.version.trim();
    if version.is_empty() {
        return Err(AgentError::Manifest("empty version".to_string()));
    }
    Ok(version.to_string())
}

#[derive(Debug)]
pub struct ManifestAgentHost {
    store: PathBuf,
    bundled_version: String,
    manifest: Option<(Url, Duration)>,
    client: Client,
    events: mpsc::UnboundedSender<PlatformEvent>,
    task: Option<JoinHandle<()>>,
}

impl ManifestAgentHost {
    pub fn new(
        store: PathBuf,
        bundled_version: impl Into<String>,
        events: mpsc::UnboundedSender<PlatformEvent>,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(MANIFEST_TIMEOUT)
            .build()
            .map_err(|err| AgentError::Unavailable(err.to_string()))?;
        Ok(Self {
            store,
            bundled_version: bundled_version.into(),
            manifest: None,
            client,
            events,
            task: None,
        })
    }

    /// Poll `url` every `interval` instead of installing the bundled version.
    pub fn with_manifest(mut self, url: Url, interval: Duration) -> Self {
        self.manifest = Some((url, interval));
        self
    }

    /// `<cache dir>/endocalc/agent.json`.
    #[must_use]
    pub fn default_store() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(data_dir)
            .join("endocalc")
            .join("agent.json")
    }

    fn read_record(&self) -> Result<Option<AgentRecord>, AgentError> {
        match fs::read(&self.store) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(record) => Ok(Some(record)),
                Err(err) => {
                    tracing::warn!(
                        "Discarding unreadable agent record {}: {err}",
                        self.store.display()
                    );
                    Ok(None)
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

fn write_record(path: &Path, record: &AgentRecord) -> Result<(), AgentError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(record)
        .map_err(|err| AgentError::Store(err.into()))?;

    // Temp file + rename so a crash never leaves a truncated record.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

impl AgentHost for ManifestAgentHost {
    fn unregister_all(&mut self) -> Result<usize, AgentError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        match fs::remove_file(&self.store) {
            Ok(()) => Ok(1),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    fn register(&mut self, script: &str) -> Result<AgentRegistration, AgentError> {
        let script = script.trim();
        if script.is_empty() {
            return Err(AgentError::EmptyScript);
        }

        let mut record = self.read_record()?.unwrap_or_default();
        if self.task.is_none() {
            if let Some(waiting) = record.waiting.take() {
                tracing::info!("Activating waiting agent version {waiting}");
                record.active = Some(waiting);
            }
            record.script = script.to_string();
            write_record(&self.store, &record)?;

            let poll = Poll {
                store: self.store.clone(),
                bundled_version: self.bundled_version.clone(),
                manifest: self.manifest.clone(),
                client: self.client.clone(),
                events: self.events.clone(),
                record: record.clone(),
            };
            self.task = Some(tokio::spawn(poll.run()));
        }

        Ok(AgentRegistration {
            scope: script.to_string(),
            active: record.active,
        })
    }
}

impl Drop for ManifestAgentHost {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Poll {
    store: PathBuf,
    bundled_version: String,
    manifest: Option<(Url, Duration)>,
    client: Client,
    events: mpsc::UnboundedSender<PlatformEvent>,
    record: AgentRecord,
}

impl Poll {
    async fn run(mut self) {
        let Some((url, interval)) = self.manifest.clone() else {
            let version = self.bundled_version.clone();
            self.install(&version);
            return;
        };

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match fetch_manifest(&self.client, &url).await {
                Ok(version) => {
                    if !self.install(&version) {
                        break;
                    }
                }
                Err(err) => tracing::warn!("Manifest check failed: {err}"),
            }
        }
    }

    /// Install `version` unless it is already active or waiting. Returns
    /// `false` once the shell has stopped listening.
    fn install(&mut self, version: &str) -> bool {
        let known = [&self.record.active, &self.record.waiting]
            .into_iter()
            .any(|slot| slot.as_deref() == Some(version));
        if known {
            return true;
        }

        let first = self.record.active.is_none();
        let superseded = if first {
            self.record.active = Some(version.to_string());
            None
        } else {
            self.record.waiting.replace(version.to_string())
        };
        if let Err(err) = write_record(&self.store, &self.record) {
            tracing::warn!("Failed to persist agent record: {err}");
        }

        let mut events = vec![
            AgentEvent::UpdateFound {
                version: version.to_string(),
            },
            state_changed(version, AgentState::Installing),
            state_changed(version, AgentState::Installed),
        ];
        if let Some(previous) = superseded {
            events.push(state_changed(&previous, AgentState::Redundant));
        }
        if first {
            events.push(state_changed(version, AgentState::Activating));
            events.push(state_changed(version, AgentState::Activated));
            events.push(AgentEvent::ControllerChange {
                version: version.to_string(),
            });
        }
        events
            .into_iter()
            .all(|event| self.events.send(PlatformEvent::Agent(event)).is_ok())
    }
}

fn state_changed(version: &str, state: AgentState) -> AgentEvent {
    AgentEvent::StateChanged {
        version: version.to_string(),
        state,
    }
}
