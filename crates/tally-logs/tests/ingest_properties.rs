use std::fs;
use std::path::Path;

use tempfile::TempDir;

use tally_logs::{
    DEFAULT_SUFFIX, IngestError, Ingestor, LogStore, RedrawHandle, StatusMarker, UNKNOWN_TIMESTAMP,
    ViewportController, ViewportIntent,
};

fn setup(height: usize) -> (Ingestor, LogStore, RedrawHandle) {
    let store = LogStore::new(height);
    let (redraw, _rx) = RedrawHandle::channel();
    let ingestor = Ingestor::new(store.clone(), redraw.clone(), DEFAULT_SUFFIX);
    (ingestor, store, redraw)
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn mixed_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "web/access.log",
        "10.0.0.1 - - [01/Jan/2024:10:05:00 +0000] \"GET / HTTP/1.1\" 200 12\n\
         10.0.0.2 - - [01/Jan/2024:09:55:00 +0000] \"GET /missing HTTP/1.1\" 404 0\n",
    );
    write(
        tmp.path(),
        "app.log",
        "2024-01-01T10:00:00Z started\n\
         just some text\n\
         2024-01-01T09:30:00+00:00 ERROR boot failed\n",
    );
    write(
        tmp.path(),
        "cron.log",
        "Mon Jan  1 09:45:00 2024 job ran\n",
    );
    write(tmp.path(), "ignored.txt", "2024-01-01T00:00:00Z not a log\n");
    tmp
}

#[test]
fn test_scenario_reorders_ascending() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "a.log",
        "2024-01-01T10:00:00Z hello\n2024-01-01T09:00:00Z world\n",
    );

    let (ingestor, store, _) = setup(20);
    ingestor.ingest(tmp.path()).unwrap();

    let lines = store.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].raw(), "2024-01-01T09:00:00Z world");
    assert_eq!(lines[1].raw(), "2024-01-01T10:00:00Z hello");
    assert_eq!(store.selected_line(), Some(1));
}

#[test]
fn test_sorted_after_ingestion() {
    let tmp = mixed_tree();
    let (ingestor, store, _) = setup(20);
    let report = ingestor.ingest(tmp.path()).unwrap();

    assert_eq!(report.files, 3);
    assert_eq!(report.lines, 6);

    let lines = store.lines();
    for pair in lines.windows(2) {
        assert!(pair[0].timestamp() <= pair[1].timestamp());
    }
    assert!(lines.iter().all(|l| !l.raw().contains("not a log")));
}

#[test]
fn test_untimestamped_line_is_kept_at_head() {
    let tmp = mixed_tree();
    let (ingestor, store, _) = setup(20);
    ingestor.ingest(tmp.path()).unwrap();

    let lines = store.lines();
    let plain = &lines[0];
    assert_eq!(plain.raw(), "just some text");
    assert!(!plain.has_timestamp());
    assert_eq!(plain.timestamp(), UNKNOWN_TIMESTAMP);
    assert_eq!(plain.marker(), StatusMarker::Normal);
}

#[test]
fn test_classification_survives_ingestion() {
    let tmp = mixed_tree();
    let (ingestor, store, _) = setup(20);
    ingestor.ingest(tmp.path()).unwrap();

    let notable: Vec<_> = store
        .lines()
        .iter()
        .filter(|l| l.marker() == StatusMarker::Notable)
        .map(|l| l.raw().to_string())
        .collect();

    assert_eq!(notable.len(), 2);
    assert!(notable.iter().any(|r| r.contains("ERROR boot failed")));
    assert!(notable.iter().any(|r| r.contains("/missing")));
}

#[test]
fn test_reingestion_is_idempotent() {
    let tmp = mixed_tree();
    let (ingestor, store, _) = setup(20);

    ingestor.ingest(tmp.path()).unwrap();
    let first: Vec<_> = store.lines().iter().map(|l| (**l).clone()).collect();

    ingestor.ingest(tmp.path()).unwrap();
    let second: Vec<_> = store.lines().iter().map(|l| (**l).clone()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_equal_timestamps_keep_discovery_order() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.log", "first\nsecond\n");
    write(tmp.path(), "b.log", "third\n");

    let (ingestor, store, _) = setup(20);
    ingestor.ingest(tmp.path()).unwrap();

    let raws: Vec<_> = store.lines().iter().map(|l| l.raw().to_string()).collect();
    assert_eq!(raws, vec!["first", "second", "third"]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.log", "2024-01-01T10:00:00Z a\n");
    write(tmp.path(), "b.log", "2024-01-01T11:00:00Z b\n");
    std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("c.log")).unwrap();

    let (ingestor, store, _) = setup(20);
    let report = ingestor.ingest(tmp.path()).unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("c.log"));
    assert!(!report.skipped[0].reason.is_empty());

    let raws: Vec<_> = store.lines().iter().map(|l| l.raw().to_string()).collect();
    assert_eq!(raws, vec!["2024-01-01T10:00:00Z a", "2024-01-01T11:00:00Z b"]);
    assert_eq!(store.status().skipped, 1);
}

#[test]
fn test_failed_pass_leaves_previous_lines() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("logs");
    write(&root, "a.log", "one\ntwo\nthree\n");

    let (ingestor, store, _) = setup(20);
    ingestor.ingest(&root).unwrap();
    assert_eq!(store.len(), 3);

    fs::remove_dir_all(&root).unwrap();
    let err = ingestor.ingest(&root).unwrap_err();
    assert!(matches!(err, IngestError::RootUnavailable { .. }));

    assert_eq!(store.len(), 3);
    assert_eq!(store.selected_line(), Some(2));
    assert!(store.status().last_error.is_some());
}

#[test]
fn test_empty_directory_yields_empty_store() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "notes.txt", "nothing here");

    let (ingestor, store, _) = setup(20);
    let report = ingestor.ingest(tmp.path()).unwrap();

    assert_eq!(report.files, 0);
    assert!(store.is_empty());
    assert_eq!(store.selected_line(), None);
    assert!(store.visible_slice().is_empty());
}

#[test]
fn test_navigation_after_reload_stays_in_bounds() {
    let tmp = TempDir::new().unwrap();
    let body: String = (0..30)
        .map(|i| format!("2024-01-01T10:{:02}:00Z line {}\n", i, i))
        .collect();
    write(tmp.path(), "a.log", &body);

    let (ingestor, store, redraw) = setup(8);
    let controller = ViewportController::new(store.clone(), redraw);
    ingestor.ingest(tmp.path()).unwrap();

    assert_eq!(store.selected_line(), Some(29));
    assert_eq!(store.scroll_offset(), 22);

    controller.apply(ViewportIntent::Top);
    controller.apply(ViewportIntent::MoveDown);
    assert_eq!(store.selected_line(), Some(1));

    // Shrinking the file resets the view to the new tail
    write(tmp.path(), "a.log", "2024-01-01T10:00:00Z only\n");
    ingestor.ingest(tmp.path()).unwrap();
    assert_eq!(store.selected_line(), Some(0));
    assert_eq!(store.scroll_offset(), 0);

    let snap = store.visible_slice();
    assert_eq!(snap.lines.len(), 1);
    assert_eq!(snap.selected, Some(0));
}

#[test]
fn test_compact_and_zulu_offsets_sort_in_utc_order() {
    let tmp = TempDir::new().unwrap();
    // 10:00+0200 is 08:00Z, so it precedes the 09:00Z line
    write(
        tmp.path(),
        "a.log",
        "2024-01-01T09:00:00Z later\n\
         2024-01-01T10:00:00+0200 earlier\n",
    );

    let (ingestor, store, _) = setup(10);
    ingestor.ingest(tmp.path()).unwrap();

    let raws: Vec<_> = store.lines().iter().map(|l| l.raw().to_string()).collect();
    assert_eq!(
        raws,
        vec![
            "2024-01-01T10:00:00+0200 earlier".to_string(),
            "2024-01-01T09:00:00Z later".to_string(),
        ]
    );
}
