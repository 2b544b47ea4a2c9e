use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use tally_types::LogLine;

use crate::classify::LineClassifier;
use crate::store::{LogStore, RedrawHandle};
use crate::timestamp::TimestampExtractor;

/// Default suffix identifying log files during directory traversal
pub const DEFAULT_SUFFIX: &str = ".log";

/// Errors that abort an ingestion pass before any file is read
#[derive(Error, Debug)]
pub enum IngestError {
    /// The root path cannot be inspected
    #[error("Log path {path:?} is unavailable: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk failed at the root
    #[error("Failed to traverse {path:?}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A candidate file that could not be read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a completed ingestion pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files that were read
    pub files: usize,

    /// Lines now in the store
    pub lines: usize,

    /// Files skipped because they could not be read
    pub skipped: Vec<SkippedFile>,
}

/// Reads a file or directory tree into the log store
///
/// Files are read and parsed without holding the store lock; the sorted result
/// is swapped in as one replacement. Passes are serialized: a pass started
/// while another is running waits for it to finish.
pub struct Ingestor {
    store: LogStore,
    redraw: RedrawHandle,
    suffix: String,
    extractor: TimestampExtractor,
    classifier: LineClassifier,
    pass: Mutex<()>,
}

impl Ingestor {
    pub fn new(store: LogStore, redraw: RedrawHandle, suffix: impl Into<String>) -> Self {
        Self {
            store,
            redraw,
            suffix: suffix.into(),
            extractor: TimestampExtractor::new(),
            classifier: LineClassifier::new(),
            pass: Mutex::new(()),
        }
    }

    /// Use a custom timestamp extractor
    pub fn with_extractor(mut self, extractor: TimestampExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The store this ingestor writes into
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn request_redraw(&self) {
        self.redraw.request();
    }

    /// Run a full ingestion pass over `root` and replace the store contents
    ///
    /// Unreadable files are skipped and listed in the report. If `root` itself
    /// cannot be traversed the store keeps its previous lines.
    pub fn ingest(&self, root: &Path) -> Result<IngestReport, IngestError> {
        let _pass = self.pass.lock();

        let candidates = match self.discover(root) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "ingestion pass aborted");
                self.store.record_failure(e.to_string());
                self.redraw.request();
                return Err(e);
            }
        };

        let mut report = IngestReport::default();
        let mut lines = Vec::new();

        for path in candidates {
            match fs::read(&path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let source: Arc<Path> = Arc::from(path.as_path());
                    let before = lines.len();
                    lines.extend(
                        split_lines(&content)
                            .into_iter()
                            .map(|raw| self.parse_line(&source, raw)),
                    );
                    report.files += 1;
                    debug!(path = %path.display(), lines = lines.len() - before, "loaded file");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    report.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Stable: equal timestamps keep discovery order
        lines.sort_by_key(LogLine::timestamp);
        report.lines = lines.len();

        self.store
            .replace(lines, report.files, report.skipped.len());
        self.redraw.request();

        info!(
            files = report.files,
            lines = report.lines,
            skipped = report.skipped.len(),
            "ingestion pass complete"
        );

        Ok(report)
    }

    /// Build a line record from raw text
    pub fn parse_line(&self, source: &Arc<Path>, raw: &str) -> LogLine {
        let timestamp = self.extractor.extract(raw);
        let (marker, severity) = self.classifier.classify(raw);
        LogLine::new(Arc::clone(source), raw.to_string(), timestamp, marker, severity)
    }

    /// List candidate files under `root` in a deterministic order
    ///
    /// A file root is its own single candidate. Directories are walked
    /// recursively without following symlinked directories; entries whose name
    /// ends with the suffix are kept.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        let metadata = fs::metadata(root).map_err(|source| IngestError::RootUnavailable {
            path: root.to_path_buf(),
            source,
        })?;

        if !metadata.is_dir() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(IngestError::Traversal {
                        path: root.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(&self.suffix) {
                candidates.push(entry.into_path());
            }
        }

        Ok(candidates)
    }
}

/// Split file content into lines, dropping leading and trailing blank lines
fn split_lines(content: &str) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].to_vec()
}
