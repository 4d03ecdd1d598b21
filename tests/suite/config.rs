//! Configuration file handling end to end.

use std::fs;

use tempfile::tempdir;
use tokio::sync::mpsc;

use endocalc_engine::platform::NoAgentHost;
use endocalc_engine::{
    App, ConfigError, EndocalcConfig, REQUIRED_ANCHORS, Route, ShellContext, ShellSettings, View,
};

use crate::common::id;

const CONFIG: &str = r##"
[app]
start_route = "#bmi"
ascii_only = true

[loader]
base = "https://calc.example.org/app"

[offline]
agent_script = "./agent.js"
probe_url = "not a url"
probe_interval_secs = 0
"##;

#[test]
fn config_file_drives_shell_settings() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, CONFIG).expect("write config");

    let config = EndocalcConfig::load_from(&path)
        .expect("parses")
        .expect("file exists");
    let settings = ShellSettings::from_config(&config);

    assert_eq!(settings.loader_base, "https://calc.example.org/app/");
    assert_eq!(settings.agent_script, "./agent.js");
    assert!(settings.ui_options.ascii_only);
    assert!(!settings.ui_options.high_contrast);
    assert_eq!(config.start_route(), Route::from_fragment("bmi"));
    assert!(config.probe_url().is_none(), "invalid urls are ignored");
}

#[test]
fn malformed_config_reports_its_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[app\nstart_route = 3").expect("write config");

    let err = EndocalcConfig::load_from(&path).expect_err("rejects");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
}

#[test]
fn missing_config_is_not_an_error() {
    let dir = tempdir().expect("tempdir");
    let loaded = EndocalcConfig::load_from(&dir.path().join("absent.toml")).expect("ok");
    assert!(loaded.is_none());
}

#[tokio::test]
async fn configured_start_route_opens_calculator() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, CONFIG).expect("write config");
    let config = EndocalcConfig::load_from(&path)
        .expect("parses")
        .expect("file exists");

    let (context, messages) = ShellContext::new(ShellSettings::from_config(&config));
    let (_platform_tx, platform) = mpsc::unbounded_channel();
    let mut app = App::new(
        context,
        messages,
        platform,
        Box::new(NoAgentHost),
        &REQUIRED_ANCHORS,
    )
    .expect("anchors present");
    app.start(config.start_route());
    app.settle().await;

    assert_eq!(app.view(), &View::CalculatorShown(id("bmi")));
    assert!(app.ui_options().ascii_only);
    assert!(!app.cache_state().registered);
}
