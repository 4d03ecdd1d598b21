//! The application context shared by the shell's components.

use std::sync::Arc;

use tokio::sync::mpsc;

use endocalc_types::{LoadCompletion, ShellMessage, UiOptions};

use crate::config::{DEFAULT_AGENT_SCRIPT, DEFAULT_LOADER_BASE, EndocalcConfig};
use crate::loader::ModuleLoader;
use crate::offline::OfflineCacheManager;
use crate::router::LoadRequest;

/// Settings the shell needs at runtime, resolved once from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub loader_base: String,
    pub agent_script: String,
    pub dev_mode: bool,
    pub ui_options: UiOptions,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            loader_base: DEFAULT_LOADER_BASE.to_string(),
            agent_script: DEFAULT_AGENT_SCRIPT.to_string(),
            dev_mode: false,
            ui_options: UiOptions::default(),
        }
    }
}

impl ShellSettings {
    #[must_use]
    pub fn from_config(config: &EndocalcConfig) -> Self {
        Self {
            loader_base: config.loader_base(),
            agent_script: config.agent_script(),
            dev_mode: config.dev_mode(),
            ui_options: config.ui_options(),
        }
    }
}

/// Constructed once at startup and owned by the shell controller.
///
/// Loads are spawned from here so that their results come back through the
/// same channel as every other [`ShellMessage`].
#[derive(Debug)]
pub struct ShellContext {
    settings: ShellSettings,
    loader: Arc<ModuleLoader>,
    messages: mpsc::UnboundedSender<ShellMessage>,
}

impl ShellContext {
    /// Context over the bundled modules, plus the receiving end of its
    /// message channel.
    #[must_use]
    pub fn new(settings: ShellSettings) -> (Self, mpsc::UnboundedReceiver<ShellMessage>) {
        let loader = ModuleLoader::bundled(settings.loader_base.clone());
        Self::with_loader(settings, loader)
    }

    #[must_use]
    pub fn with_loader(
        settings: ShellSettings,
        loader: ModuleLoader,
    ) -> (Self, mpsc::UnboundedReceiver<ShellMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let context = Self {
            settings,
            loader: Arc::new(loader),
            messages: tx,
        };
        (context, rx)
    }

    #[must_use]
    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    #[must_use]
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    #[must_use]
    pub fn offline_manager(&self) -> OfflineCacheManager {
        OfflineCacheManager::new(self.settings.agent_script.clone(), self.settings.dev_mode)
    }

    /// Resolve `request` on a tokio task; the outcome arrives as
    /// [`ShellMessage::LoadCompleted`].
    pub fn spawn_load(&self, request: LoadRequest) {
        let loader = Arc::clone(&self.loader);
        let messages = self.messages.clone();
        tokio::spawn(async move {
            let result = loader.load(&request.id);
            let completion = LoadCompletion {
                id: request.id,
                generation: request.generation,
                resync: request.resync,
                result,
            };
            if messages
                .send(ShellMessage::LoadCompleted(completion))
                .is_err()
            {
                tracing::debug!("Load finished after the shell went away");
            }
        });
    }
}
