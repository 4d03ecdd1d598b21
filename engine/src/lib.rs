//! Shell engine for EndoCalc: navigation, module loading and offline handling.
//!
//! This crate contains the [`App`] shell controller without TUI dependencies:
//!
//! - **Module loading**: [`ModuleLoader`] resolves ids against the static
//!   primary and fallback registries
//! - **Navigation**: [`Router`] with per-navigation generations so that only
//!   the latest load is ever rendered
//! - **Offline**: [`OfflineCacheManager`] folds caching-agent and connectivity
//!   events into shell messages
//! - **Platform**: reqwest-backed agent host and connectivity probe
//!
//! The TUI layer (`endocalc_tui`) reads state from `App` and forwards input
//! back to it. No rendering logic lives in this crate.

mod anchors;
mod app;
mod config;
mod context;
mod loader;
mod offline;
pub mod platform;
mod router;

pub use anchors::{CALCULATOR_CONTAINER, MAIN_CONTAINER, REQUIRED_ANCHORS, require_anchors};
pub use app::{App, Detail};
pub use config::{
    AppConfig, ConfigError, DEV_MODE_ENV, EndocalcConfig, LoaderConfig, OfflineConfig,
    config_path, data_dir,
};
pub use context::{ShellContext, ShellSettings};
pub use loader::{CatalogEntry, FALLBACK_PREFIX, ModuleLoader};
pub use offline::{OfflineCacheManager, UpdateNotification};
pub use router::{LoadRequest, Router, RouterState};

pub use endocalc_types::{
    CacheState, CalculatorId, Container, Field, FieldKind, FormEvent, InitializationError,
    LoadCompletion, Output, PlatformEvent, Route, ShellMessage, UiOptions, View,
};
