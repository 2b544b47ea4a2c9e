//! Log ingestion and viewport state for tally
//!
//! This crate provides timestamp extraction, line classification, the shared
//! log store with its viewport controller, ingestion, and live reload.

mod classify;
mod ingest;
mod store;
mod timestamp;
mod viewport;
mod watcher;

pub use classify::{LineClassifier, SCORE_CLIENT_ERROR, SCORE_ERROR_TOKEN, SCORE_SERVER_ERROR};
pub use ingest::{DEFAULT_SUFFIX, IngestError, IngestReport, Ingestor, SkippedFile};
pub use store::{LogStore, RedrawHandle};
pub use timestamp::{Recognizer, TimestampExtractor};
pub use viewport::ViewportController;
pub use watcher::{
    DEFAULT_DEBOUNCE_MS, FileWatcher, WatchError, WatchEvent, WatcherConfig, reload,
    run_reload_loop,
};

// Re-export types used in our public API
pub use tally_types::{
    ArcLogLine, LogLine, StatusMarker, StoreStatus, UNKNOWN_TIMESTAMP, ViewportIntent,
    ViewportSnapshot,
};
