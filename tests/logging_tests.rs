use std::fs;

use mathdrill::logging;
use tempfile::tempdir;

#[test]
fn init_writes_events_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("mathdrill.log");

    logging::init(&path).unwrap();
    tracing::info!(target: "mathdrill", score = 7, "attempt finished");
    tracing::debug!(target: "mathdrill", "below the default level");

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("attempt finished"));
    assert!(contents.contains("score=7"));
    assert!(!contents.contains("below the default level"));

    // a second subscriber cannot be installed
    assert!(logging::init(&path).is_err());
}

#[test]
fn init_reports_unwritable_path() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let err = logging::init(&blocker.join("mathdrill.log"));
    assert!(err.is_err());
}
