mod config;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tally_logs::{
    FileWatcher, Ingestor, LogStore, RedrawHandle, ViewportController, WatcherConfig, reload,
    run_reload_loop,
};
use tally_tui::{
    Action, AppState, Event, EventHandler, HelpOverlay, Highlighter, KeyBindings, Layout,
    LogViewerScreen, Tui,
};

use crate::config::Settings;

/// Tally - A terminal viewer for a log file or a directory of log files
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file or directory to view
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Suffix identifying log files inside a directory [default: .log]
    #[arg(long)]
    suffix: Option<String>,

    /// Config file (defaults to ~/.config/tally/config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file [default: ~/.local/state/tally/tally.log]
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Load once and do not watch for changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?
        .with_overrides(args.suffix.clone(), args.log_file.clone());
    settings.validate()?;

    init_tracing(settings.log_file.as_deref())?;

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Cannot open log path {}", args.path.display()))?;

    run_app(args, settings, root).await
}

/// Initialize tracing for diagnostics
///
/// The TUI owns the terminal, so output goes to a file: the configured one,
/// else the default location. If the default cannot be opened, output is
/// discarded.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let file = match log_file {
        Some(path) => Some(open_log_file(path)?),
        None => Settings::default_log_path().and_then(|path| open_log_file(&path).ok()),
    };

    match file {
        Some(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))
}

async fn run_app(args: Args, settings: Settings, root: PathBuf) -> Result<()> {
    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    // Initialize TUI
    let mut tui = Tui::new().context("Failed to initialize terminal")?;
    let size = tui.size().context("Failed to read terminal size")?;

    // Shared store sized to the rows the log block will get
    let (redraw, mut redraw_rx) = RedrawHandle::channel();
    let store = LogStore::new(Layout::log_rows(size.height));
    let controller = ViewportController::new(store.clone(), redraw.clone());
    let ingestor = Arc::new(Ingestor::new(store.clone(), redraw, settings.suffix.clone()));

    // Watch before the first pass so no write in between is missed
    let watcher = if args.no_watch {
        None
    } else {
        start_watcher(&settings, &root, &ingestor, &store, &cancel)
    };

    if let Err(e) = reload(&ingestor, &root).await {
        warn!(error = %e, "initial ingestion failed");
    }

    let mut state = AppState::new(args.path.clone(), settings.suffix.clone());
    state.single_file = root.is_file();
    state.ui_state.show_timestamps = settings.show_timestamps;
    state.ui_state.show_sources = settings.show_sources;

    let mut events = EventHandler::new(Duration::from_millis(settings.tick_ms), cancel.child_token());
    let keybindings = KeyBindings::new();
    let highlighter = Highlighter::new();

    // Initial render
    render(&mut tui, &state, &store, &highlighter)?;

    // Main event loop
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        if let Some(action) = keybindings.get_action(state.key_context(), &key) {
                            handle_action(&mut state, &controller, &ingestor, &root, action);
                        }
                    }
                    Event::Resize(_, height) => {
                        controller.resize(Layout::log_rows(height));
                    }
                    Event::Tick => {
                        // Re-render so the reload age stays current
                    }
                    Event::Error(e) => {
                        warn!(error = %e, "terminal input error");
                    }
                }
            }

            // Store changed (reload or navigation)
            Some(()) = redraw_rx.recv() => {
                // Coalesce queued requests into one frame
                while redraw_rx.try_recv().is_ok() {}
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &state, &store, &highlighter)?;
    }

    // Cleanup
    cancel.cancel();
    events.shutdown().await;
    if let Some((watcher, task)) = watcher {
        // A pass in progress finishes before the loop sees cancellation
        if let Err(e) = task.await {
            warn!(error = %e, "reload loop ended abnormally");
        }
        drop(watcher);
    }
    tui.restore()?;

    info!("tally exited cleanly");
    Ok(())
}

/// Start live reload, or log why it is unavailable and carry on without it
fn start_watcher(
    settings: &Settings,
    root: &Path,
    ingestor: &Arc<Ingestor>,
    store: &LogStore,
    cancel: &CancellationToken,
) -> Option<(FileWatcher, JoinHandle<()>)> {
    let config = WatcherConfig::new(root.to_path_buf(), settings.suffix.clone())
        .with_debounce(Duration::from_millis(settings.debounce_ms));

    match FileWatcher::new(config) {
        Ok((watcher, events)) => {
            store.set_live_reload(true);
            let task = tokio::spawn(run_reload_loop(
                Arc::clone(ingestor),
                root.to_path_buf(),
                events,
                cancel.clone(),
            ));
            Some((watcher, task))
        }
        Err(e) => {
            warn!(error = %e, "live reload unavailable");
            None
        }
    }
}

fn handle_action(
    state: &mut AppState,
    controller: &ViewportController,
    ingestor: &Arc<Ingestor>,
    root: &Path,
    action: Action,
) {
    if state.apply(&action) {
        return;
    }

    match action {
        Action::Navigate(intent) => {
            controller.apply(intent);
        }
        Action::Reload => {
            debug!("manual reload requested");
            let ingestor = Arc::clone(ingestor);
            let root = root.to_path_buf();
            tokio::spawn(async move {
                if let Err(e) = reload(&ingestor, &root).await {
                    warn!(error = %e, "manual reload failed, keeping previous lines");
                }
            });
        }
        _ => {}
    }
}

/// Cancel the shared token on Ctrl-C or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = terminate.recv() => {}
                        _ = cancel.cancelled() => return,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "cannot listen for SIGTERM");
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = cancel.cancelled() => return,
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = cancel.cancelled() => return,
            }
        }

        debug!("termination signal received");
        cancel.cancel();
    });
}

fn render(tui: &mut Tui, state: &AppState, store: &LogStore, highlighter: &Highlighter) -> Result<()> {
    let snapshot = store.visible_slice();
    let now = Utc::now();

    tui.terminal().draw(|frame| {
        LogViewerScreen::render(frame, state, &snapshot, highlighter, now);

        // Render help overlay if visible
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;

    Ok(())
}
