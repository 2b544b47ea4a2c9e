use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use tally_types::{ArcLogLine, LogLine, StoreStatus, ViewportSnapshot};

/// Scroll and selection state over the current lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct View {
    /// Index of the first visible line
    pub scroll_offset: usize,
    /// Index of the highlighted line (None while the store is empty)
    pub selected_line: Option<usize>,
    /// Rows available for lines (always at least 1)
    pub viewport_height: usize,
    /// Number of lines in the store
    pub len: usize,
}

impl View {
    /// Land on the newest line with the view scrolled to the tail
    pub fn follow_tail(&mut self) {
        self.selected_line = self.len.checked_sub(1);
        self.scroll_offset = self.len.saturating_sub(self.viewport_height);
    }

    /// Scroll the minimum amount needed to keep the selection on screen
    pub fn reveal_selection(&mut self) {
        if let Some(selected) = self.selected_line {
            if selected < self.scroll_offset {
                self.scroll_offset = selected;
            } else if selected >= self.scroll_offset + self.viewport_height {
                self.scroll_offset = selected + 1 - self.viewport_height;
            }
        }
    }
}

struct StoreState {
    lines: Vec<ArcLogLine>,
    view: View,
    status: StoreStatus,
}

/// Thread-safe store of ingested lines plus the view state over them
///
/// Cloning yields another handle to the same store. Every read and write goes
/// through one mutex, so the renderer never sees a half-replaced line set.
#[derive(Clone)]
pub struct LogStore {
    state: Arc<Mutex<StoreState>>,
}

impl LogStore {
    /// Create an empty store for a viewport of the given height
    pub fn new(viewport_height: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                lines: Vec::new(),
                view: View {
                    scroll_offset: 0,
                    selected_line: None,
                    viewport_height: viewport_height.max(1),
                    len: 0,
                },
                status: StoreStatus::default(),
            })),
        }
    }

    /// Swap in a freshly ingested, already sorted line set
    ///
    /// The view is recomputed to follow the tail since line count and order
    /// may have changed arbitrarily.
    pub fn replace(&self, lines: Vec<LogLine>, files: usize, skipped: usize) {
        let lines: Vec<ArcLogLine> = lines.into_iter().map(Arc::new).collect();

        let mut state = self.state.lock();
        state.view.len = lines.len();
        state.view.follow_tail();
        state.lines = lines;
        state.status.files = files;
        state.status.skipped = skipped;
        state.status.loaded_at = Some(Utc::now());
        state.status.last_error = None;
    }

    /// Note a failed ingestion pass; the current lines stay in place
    pub fn record_failure(&self, message: impl Into<String>) {
        self.state.lock().status.last_error = Some(message.into());
    }

    /// Record whether file changes are being watched
    pub fn set_live_reload(&self, enabled: bool) {
        self.state.lock().status.live_reload = enabled;
    }

    /// Copy the visible slice and selection for the renderer
    pub fn visible_slice(&self) -> ViewportSnapshot {
        let state = self.state.lock();
        let view = state.view;
        let start = view.scroll_offset.min(state.lines.len());
        let end = (start + view.viewport_height).min(state.lines.len());

        ViewportSnapshot {
            lines: state.lines[start..end].to_vec(),
            selected: view
                .selected_line
                .filter(|&s| s >= start && s < end)
                .map(|s| s - start),
            selected_line: view.selected_line,
            scroll_offset: view.scroll_offset,
            viewport_height: view.viewport_height,
            total: state.lines.len(),
            status: state.status.clone(),
        }
    }

    /// All lines in display order
    pub fn lines(&self) -> Vec<ArcLogLine> {
        self.state.lock().lines.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().lines.is_empty()
    }

    pub fn selected_line(&self) -> Option<usize> {
        self.state.lock().view.selected_line
    }

    pub fn scroll_offset(&self) -> usize {
        self.state.lock().view.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.state.lock().view.viewport_height
    }

    pub fn status(&self) -> StoreStatus {
        self.state.lock().status.clone()
    }

    /// Run a read-modify-write on the view under the store lock
    pub(crate) fn update_view<R>(&self, f: impl FnOnce(&mut View) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state.view)
    }
}

/// Notification channel telling the renderer to repaint
///
/// Sending does not touch the store; the renderer takes its own snapshot.
#[derive(Clone)]
pub struct RedrawHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl RedrawHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn request(&self) {
        // Receiver gone means the UI is shutting down
        let _ = self.tx.send(());
    }
}
