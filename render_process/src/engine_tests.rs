//! Unit tests for the Engine logger host
//!
//! The logger is process-wide, so every test here is #[serial] and filters
//! captured entries by its own source string (other unit tests may log
//! concurrently through the same sink).

use crate::rproc::Engine;
use crate::rproc::log::{Logger, LogEntry, LogSeverity};
use crate::{engine_bail, engine_err, engine_info, engine_warn_err};
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn captured_from(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// LOGGER REPLACEMENT TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_plain_log() {
    let entries = install_capture();
    Engine::log(LogSeverity::Info, "test::engine_plain", "hello".to_string());

    let captured = captured_from(&entries, "test::engine_plain");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "hello");
    assert!(captured[0].file.is_none());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = install_capture();
    Engine::log_detailed(LogSeverity::Error, "test::engine_detailed", "boom".to_string(), "x.rs", 7);

    let captured = captured_from(&entries, "test::engine_detailed");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].file, Some("x.rs"));
    assert_eq!(captured[0].line, Some(7));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let entries = install_capture();
    Engine::reset_logger();
    Engine::log(LogSeverity::Warn, "test::engine_reset", "after reset".to_string());

    assert!(captured_from(&entries, "test::engine_reset").is_empty());
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_info_macro_formats_arguments() {
    let entries = install_capture();
    engine_info!("test::engine_macro", "{} waves, {} steps", 3, 7);

    let captured = captured_from(&entries, "test::engine_macro");
    assert_eq!(captured[0].message, "3 waves, 7 steps");

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let entries = install_capture();
    let err = engine_err!("test::engine_err", "Failed to create {}", "image");

    match err {
        Error::BackendError(msg) => assert_eq!(msg, "Failed to create image"),
        other => panic!("unexpected error: {:?}", other),
    }
    let captured = captured_from(&entries, "test::engine_err");
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].line.is_some());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn bails(flag: bool) -> Result<u32> {
        if flag {
            engine_bail!("test::engine_bail", "bailing with {}", flag);
        }
        Ok(1)
    }

    let entries = install_capture();
    assert!(bails(false).is_ok());
    match bails(true) {
        Err(Error::BackendError(msg)) => assert!(msg.contains("bailing with true")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(captured_from(&entries, "test::engine_bail").len(), 1);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_warn_err_logs_at_warn() {
    let entries = install_capture();
    let _ = engine_warn_err!("test::engine_warn_err", "soft failure");

    let captured = captured_from(&entries, "test::engine_warn_err");
    assert_eq!(captured[0].severity, LogSeverity::Warn);

    Engine::reset_logger();
}
