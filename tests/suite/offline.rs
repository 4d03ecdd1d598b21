//! Caching agent and connectivity adapters wired into a running shell.

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::mpsc;
use url::Url;
use wiremock::MockServer;

use endocalc_engine::platform::{AgentRecord, ConnectivityProbe, ManifestAgentHost};
use endocalc_engine::{PlatformEvent, Route, View};

use crate::common::{build, id, mount_manifest, shell, tick_until};

fn write_record(path: &Path, record: &AgentRecord) {
    fs::write(path, serde_json::to_vec(record).expect("serializes")).expect("writes");
}

#[tokio::test]
async fn first_install_registers_without_announcing() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("agent.json");
    let (tx, rx) = mpsc::unbounded_channel::<PlatformEvent>();
    let host = ManifestAgentHost::new(store.clone(), "1.0.0", tx).expect("host builds");

    let mut app = build(Box::new(host), rx);
    assert!(app.cache_state().registered);

    // The bundled install runs once and ends with a controller change.
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.tick();
    assert!(app.notification().is_none());
    assert!(!app.cache_state().update_available);
    assert!(store.exists());
}

#[tokio::test]
async fn manifest_update_is_announced_once_then_activates_next_session() {
    let server = MockServer::start().await;
    mount_manifest(&server, "1.1.0").await;
    let manifest = Url::parse(&format!("{}/manifest.json", server.uri())).expect("url");

    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("agent.json");
    write_record(
        &store,
        &AgentRecord {
            script: "./sw.js".to_string(),
            active: Some("1.0.0".to_string()),
            waiting: None,
        },
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let host = ManifestAgentHost::new(store.clone(), "1.0.0", tx)
        .expect("host builds")
        .with_manifest(manifest.clone(), Duration::from_millis(20));
    let mut app = build(Box::new(host), rx);

    assert!(tick_until(&mut app, |app| app.notification().is_some()).await);
    assert_eq!(
        app.notification().map(|n| n.version.as_str()),
        Some("1.1.0")
    );
    app.dismiss_notification();

    // Later polls see the same version and stay quiet.
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.tick();
    assert!(app.notification().is_none());
    drop(app);

    let (tx, rx) = mpsc::unbounded_channel();
    let host = ManifestAgentHost::new(store.clone(), "1.0.0", tx)
        .expect("host builds")
        .with_manifest(manifest, Duration::from_millis(20));
    let mut app = build(Box::new(host), rx);
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.tick();
    assert!(app.notification().is_none());

    let record: AgentRecord =
        serde_json::from_slice(&fs::read(&store).expect("record")).expect("parses");
    assert_eq!(record.active.as_deref(), Some("1.1.0"));
    assert_eq!(record.waiting, None);
}

#[tokio::test]
async fn probe_failure_switches_status_without_reloading() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    let dead = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("url");

    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("bmr"));
    shell.app.settle().await;

    let probe = ConnectivityProbe::new(dead, Duration::from_millis(20)).expect("client");
    let handle = probe.spawn(shell.platform.clone());

    assert!(tick_until(&mut shell.app, |app| !app.cache_state().online).await);
    assert_eq!(shell.app.status_text(), "Offline - Using Cached Data");
    assert_eq!(shell.app.in_flight(), 0);
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("bmr")));
    handle.abort();
}

#[tokio::test]
async fn reconnect_event_resyncs_current_calculator() {
    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("egfr-mdrd"));
    shell.app.settle().await;

    for online in [false, true, true] {
        shell
            .platform
            .send(PlatformEvent::Connectivity { online })
            .expect("send");
    }
    shell.app.tick();
    assert_eq!(shell.app.in_flight(), 1);

    shell.app.settle().await;
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("egfr-mdrd")));
    assert_eq!(shell.app.status_text(), "Online");
}
