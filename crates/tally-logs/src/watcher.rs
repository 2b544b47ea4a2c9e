//! Live reload: filesystem change notifications driving re-ingestion.
//!
//! [`FileWatcher`] wraps a debounced `notify` watcher and forwards write-type
//! events for log files onto a small bounded channel. [`run_reload_loop`]
//! consumes that channel and runs one ingestion pass per event, strictly one
//! pass at a time. Bursts of changes collapse into a single pending reload
//! because a full channel means a reload is already queued.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::ingest::{IngestError, IngestReport, Ingestor};

/// Default debounce duration in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default channel buffer size for change events.
pub const DEFAULT_CHANNEL_BUFFER: usize = 1;

/// Errors that can occur while setting up file watching.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Failed to create the watcher backend
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),

    /// Failed to register a path with the backend
    #[error("Failed to watch {path:?}: {message}")]
    Watch { path: PathBuf, message: String },
}

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// One or more watched log files were written, created or removed
    Changed { paths: Vec<PathBuf> },

    /// The watcher backend reported an error; watching continues
    Error { message: String },
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// File or directory being viewed
    pub root: PathBuf,

    /// Suffix identifying log files inside a directory root
    pub suffix: String,

    /// Debounce duration for coalescing rapid changes
    pub debounce_duration: Duration,

    /// Channel buffer size for events
    pub channel_buffer: usize,
}

impl WatcherConfig {
    pub fn new(root: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            root,
            suffix: suffix.into(),
            debounce_duration: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }

    /// Set the debounce duration.
    pub fn with_debounce(mut self, duration: Duration) -> Self {
        self.debounce_duration = duration;
        self
    }

    /// Set the channel buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer = size.max(1);
        self
    }
}

/// Which paths count as the watched log set
#[derive(Debug, Clone)]
enum Scope {
    /// A single file root: only that exact path
    File(PathBuf),
    /// A directory root: any file carrying the suffix
    Suffix(String),
}

impl Scope {
    fn matches(&self, path: &Path) -> bool {
        match self {
            Self::File(root) => path == root,
            Self::Suffix(suffix) => path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(suffix.as_str())),
        }
    }
}

/// Debounced filesystem watcher over the viewed log set.
pub struct FileWatcher {
    /// The underlying debounced watcher; dropping it stops notifications
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Start watching. Returns the watcher and a receiver for change events.
    ///
    /// A directory root is watched recursively. A file root is watched through
    /// its parent directory so editors that replace the file are still seen.
    pub fn new(config: WatcherConfig) -> Result<(Self, mpsc::Receiver<WatchEvent>), WatchError> {
        let (event_tx, event_rx) = mpsc::channel(config.channel_buffer.max(1));

        let root = config
            .root
            .canonicalize()
            .unwrap_or_else(|_| config.root.clone());

        let (scope, watch_path, mode) = if root.is_dir() {
            (
                Scope::Suffix(config.suffix.clone()),
                root.clone(),
                RecursiveMode::Recursive,
            )
        } else {
            let parent = root
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (Scope::File(root.clone()), parent, RecursiveMode::NonRecursive)
        };

        let mut debouncer = new_debouncer(
            config.debounce_duration,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let paths: Vec<PathBuf> = events
                        .iter()
                        .flat_map(|e| relevant_paths(&e.event, &scope))
                        .collect();
                    if !paths.is_empty() {
                        forward(&event_tx, WatchEvent::Changed { paths });
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("File watcher error: {:?}", e);
                        forward(
                            &event_tx,
                            WatchEvent::Error {
                                message: e.to_string(),
                            },
                        );
                    }
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watch(&watch_path, mode)
            .map_err(|e| WatchError::Watch {
                path: watch_path.clone(),
                message: e.to_string(),
            })?;

        info!("Started watching {:?}", watch_path);

        Ok((
            Self {
                _debouncer: debouncer,
            },
            event_rx,
        ))
    }
}

/// Paths of a content-changing event that belong to the watched log set
fn relevant_paths(event: &Event, scope: &Scope) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event
            .paths
            .iter()
            .filter(|p| scope.matches(p))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

fn forward(tx: &mpsc::Sender<WatchEvent>, event: WatchEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => debug!("reload already pending, coalescing change"),
        Err(TrySendError::Closed(_)) => debug!("reload loop gone, dropping change"),
    }
}

/// Run one ingestion pass on the blocking pool
///
/// Passes are serialized by the ingestor, so this can be called from the
/// reload loop and from a manual refresh at the same time.
pub async fn reload(ingestor: &Arc<Ingestor>, root: &Path) -> Result<IngestReport, IngestError> {
    let ingestor = Arc::clone(ingestor);
    let root = root.to_path_buf();
    match tokio::task::spawn_blocking(move || ingestor.ingest(&root)).await {
        Ok(result) => result,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

/// Re-ingest `root` for every change event until cancelled
///
/// A pass in progress runs to completion before cancellation is observed.
/// If the event channel closes, live reload is marked unavailable and the loop
/// returns; the current lines stay usable.
pub async fn run_reload_loop(
    ingestor: Arc<Ingestor>,
    root: PathBuf,
    mut events: mpsc::Receiver<WatchEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            event = events.recv() => match event {
                Some(WatchEvent::Changed { paths }) => {
                    debug!(changed = paths.len(), "log files changed, reloading");
                    if let Err(e) = reload(&ingestor, &root).await {
                        warn!(error = %e, "reload failed, keeping previous lines");
                    }
                }
                Some(WatchEvent::Error { message }) => {
                    warn!(%message, "file watcher reported an error");
                }
                None => {
                    warn!("file watcher channel closed, live reload disabled");
                    ingestor.store().set_live_reload(false);
                    ingestor.request_redraw();
                    break;
                }
            }
        }
    }
    debug!("reload loop stopped");
}
