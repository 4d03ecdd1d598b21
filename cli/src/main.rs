//! EndoCalc CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`endocalc_engine`] (shell state) and [`endocalc_tui`]
//! (rendering), providing RAII-based terminal management with guaranteed
//! cleanup.
//!
//! ```text
//! main() -> App::new(anchors) -> TerminalSession::new() -> run_app() -> Quit
//!              |
//!              +-- ManifestAgentHost / ConnectivityProbe -> platform channel
//! ```
//!
//! # Event Loop
//!
//! A fixed 8ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`endocalc_tui::InputPump`])
//! 3. Advance shell state (`app.tick()`): platform events, then load results
//! 4. Render frame

use std::{
    env,
    fs::{self, File, OpenOptions},
    io::{Stdout, stdout},
    panic,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        size as terminal_size,
    },
};
use ratatui::{Terminal, backend::Backend, layout::Rect, prelude::CrosstermBackend};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use endocalc_engine::platform::{AgentHost, ConnectivityProbe, ManifestAgentHost, NoAgentHost};
use endocalc_engine::{
    App, EndocalcConfig, PlatformEvent, Route, ShellContext, ShellSettings, data_dir,
};
use endocalc_tui::{InputPump, available_anchors, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    vec![
        // Primary: ~/.endocalc/logs/endocalc.log
        data_dir().join("logs").join("endocalc.log"),
        // Fallback: ./.endocalc/logs/endocalc.log
        PathBuf::from(".endocalc").join("logs").join("endocalc.log"),
    ]
}

/// Send panics to the log file only. Writing to stderr would draw over the
/// alternate screen; the terminal itself is restored by `TerminalSession`.
fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        tracing::error!("Panic: {info}");
    }));
}

/// First CLI argument wins, then `[app] start_route`, then the menu.
fn initial_route(arg: Option<&str>, config: &EndocalcConfig) -> Route {
    match arg {
        Some(fragment) => Route::from_fragment(fragment),
        None => config.start_route(),
    }
}

fn agent_host(
    config: &EndocalcConfig,
    events: mpsc::UnboundedSender<PlatformEvent>,
) -> Box<dyn AgentHost> {
    let host = match ManifestAgentHost::new(
        ManifestAgentHost::default_store(),
        env!("CARGO_PKG_VERSION"),
        events,
    ) {
        Ok(host) => host,
        Err(err) => {
            tracing::warn!("Caching agent unavailable: {err}");
            return Box::new(NoAgentHost);
        }
    };
    match config.manifest_url() {
        Some(url) => Box::new(host.with_manifest(url, config.manifest_interval())),
        None => Box::new(host),
    }
}

fn spawn_probe(
    config: &EndocalcConfig,
    events: mpsc::UnboundedSender<PlatformEvent>,
) -> Option<JoinHandle<()>> {
    let url = config.probe_url()?;
    match ConnectivityProbe::new(url, config.probe_interval()) {
        Ok(probe) => Some(probe.spawn(events)),
        Err(err) => {
            tracing::warn!("Connectivity probe disabled: {err}");
            None
        }
    }
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored on drop, so the terminal
/// stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    install_panic_hook();

    let config = match EndocalcConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("Using default settings: {err}");
            EndocalcConfig::default()
        }
    };
    let arg = env::args().nth(1);
    let initial = initial_route(arg.as_deref(), &config);

    let (platform_tx, platform_rx) = mpsc::unbounded_channel();
    let host = agent_host(&config, platform_tx.clone());

    let (width, height) = terminal_size().context("failed to query terminal size")?;
    let anchors = available_anchors(Rect::new(0, 0, width, height));
    let (context, messages) = ShellContext::new(ShellSettings::from_config(&config));
    let mut app = App::new(context, messages, platform_rx, host, &anchors)
        .context("EndoCalc could not start")?;

    let probe = spawn_probe(&config, platform_tx);
    app.start(initial);

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Some(probe) = probe {
        probe.abort();
    }
    if let Err(err) = &result {
        tracing::error!("Exiting after error: {err:?}");
    }
    result
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            tracing::info!("Quit requested");
            break Ok(());
        }

        app.tick();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
