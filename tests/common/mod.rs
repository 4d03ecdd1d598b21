//! Shared test utilities and fixtures
//!
//! Builds shells over the bundled calculators with a scripted caching agent,
//! and mounts manifest endpoints on a mock server.

#![allow(dead_code)]

use std::time::Duration;

use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use endocalc_engine::platform::{AgentError, AgentHost, AgentRegistration};
use endocalc_engine::{
    App, CalculatorId, Detail, PlatformEvent, REQUIRED_ANCHORS, Route, ShellContext,
    ShellSettings,
};

/// Agent host that registers instantly with a fixed active version.
pub struct ScriptedHost {
    pub active: Option<String>,
}

impl AgentHost for ScriptedHost {
    fn unregister_all(&mut self) -> Result<usize, AgentError> {
        Ok(0)
    }

    fn register(&mut self, script: &str) -> Result<AgentRegistration, AgentError> {
        Ok(AgentRegistration {
            scope: script.to_string(),
            active: self.active.clone(),
        })
    }
}

pub struct Shell {
    pub app: App,
    pub platform: mpsc::UnboundedSender<PlatformEvent>,
}

/// A started shell at the menu, controlled by agent version `1.0.0`.
pub fn shell() -> Shell {
    shell_with_host(Box::new(ScriptedHost {
        active: Some("1.0.0".to_string()),
    }))
}

pub fn shell_with_host(host: Box<dyn AgentHost>) -> Shell {
    let (platform, platform_rx) = mpsc::unbounded_channel();
    let app = build(host, platform_rx);
    Shell { app, platform }
}

pub fn build(
    host: Box<dyn AgentHost>,
    platform: mpsc::UnboundedReceiver<PlatformEvent>,
) -> App {
    let (context, messages) = ShellContext::new(ShellSettings::default());
    let mut app = App::new(context, messages, platform, host, &REQUIRED_ANCHORS)
        .expect("both anchors present");
    app.start(Route::Menu);
    app
}

pub fn id(raw: &str) -> CalculatorId {
    CalculatorId::new(raw).expect("non-empty id")
}

/// Text of the shown calculator's subtree.
pub fn shown_text(app: &App) -> Vec<String> {
    match app.detail() {
        Some(Detail::Calculator { container, .. }) => container.text_lines(),
        other => panic!("expected a shown calculator, got {other:?}"),
    }
}

/// Tick until `done` holds, yielding to spawned tasks between ticks.
pub async fn tick_until(app: &mut App, mut done: impl FnMut(&App) -> bool) -> bool {
    for _ in 0..200 {
        app.tick();
        if done(app) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Serve `{"version": ...}` at `/manifest.json`.
pub async fn mount_manifest(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "version": version })),
        )
        .mount(server)
        .await;
}
