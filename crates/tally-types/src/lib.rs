//! Shared types for tally
//!
//! This crate contains data structures used across multiple tally crates.

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Log Types
// ============================================================================

/// Sort key given to lines without a recognizable timestamp.
///
/// A fixed value rather than the current time keeps ingestion reproducible;
/// such lines cluster at the head of the ordering.
pub const UNKNOWN_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Coarse classification derived from the raw text of a line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StatusMarker {
    #[default]
    Normal,
    Notable,
}

impl StatusMarker {
    /// Single-column marker shown before each line
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Normal => " ",
            Self::Notable => "?",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Normal => Color::DarkGray,
            Self::Notable => Color::Red,
        }
    }
}

/// One line of a source file, immutable once ingested
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    source: Arc<Path>,
    raw: String,
    timestamp: Option<DateTime<Utc>>,
    marker: StatusMarker,
    severity: u8,
}

/// Shared handle to an ingested line (cheap to clone into render snapshots)
pub type ArcLogLine = Arc<LogLine>;

impl LogLine {
    pub fn new(
        source: Arc<Path>,
        raw: String,
        timestamp: Option<DateTime<Utc>>,
        marker: StatusMarker,
        severity: u8,
    ) -> Self {
        Self {
            source,
            raw,
            timestamp,
            marker,
            severity,
        }
    }

    /// Path of the file this line was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Base file name of the source ("app.log" rather than "../logs/app.log")
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Original, unmodified line content
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed timestamp, or [`UNKNOWN_TIMESTAMP`] when none was found
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or(UNKNOWN_TIMESTAMP)
    }

    /// Whether a timestamp was actually recognized in the line
    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    pub fn marker(&self) -> StatusMarker {
        self.marker
    }

    /// Emphasis score (0 = plain); only used for rendering
    pub fn severity(&self) -> u8 {
        self.severity
    }

    /// Base colour for the line text, derived from the severity score
    pub fn color(&self) -> Color {
        match self.severity {
            0 => Color::White,
            1..=59 => Color::Yellow,
            60..=89 => Color::LightRed,
            _ => Color::Red,
        }
    }
}

// ============================================================================
// Viewport Types
// ============================================================================

/// Navigation intents understood by the viewport controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportIntent {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    /// New number of rows available for log lines
    Resize(usize),
}

/// Outcome of the most recent ingestion pass, kept next to the lines it produced
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStatus {
    /// Files that contributed lines
    pub files: usize,

    /// Files that could not be read
    pub skipped: usize,

    /// When the current lines were loaded
    pub loaded_at: Option<DateTime<Utc>>,

    /// Error from the last failed pass (previous lines are still shown)
    pub last_error: Option<String>,

    /// Whether file changes are being watched
    pub live_reload: bool,
}

/// Immutable copy of what the renderer needs, taken under the store lock
#[derive(Clone, Debug, Default)]
pub struct ViewportSnapshot {
    /// Visible slice of lines, top to bottom
    pub lines: Vec<ArcLogLine>,

    /// Index of the selected line within `lines`
    pub selected: Option<usize>,

    /// Absolute index of the selected line
    pub selected_line: Option<usize>,

    /// Absolute index of the first visible line
    pub scroll_offset: usize,

    /// Row budget the slice was cut for
    pub viewport_height: usize,

    /// Total number of lines in the store
    pub total: usize,

    pub status: StoreStatus,
}

impl ViewportSnapshot {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
