//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger formatting and the Logger trait.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "rproc::RenderProcess".to_string(),
        message: "setup complete".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_clone() {
    let entry1 = entry(LogSeverity::Warn, Some("render_process.rs"), Some(10));
    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
    assert_eq!(entry1.file, entry2.file);
    assert_eq!(entry1.line, entry2.line);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[rproc::RenderProcess]"));
    assert!(text.ends_with("setup complete"));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("vulkan.rs"), Some(123)));
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("setup complete (vulkan.rs:123)"));
}

#[test]
fn test_format_plain_requires_file_and_line() {
    // A file without a line is printed like a plain entry
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Warn, Some("vulkan.rs"), None));
    assert!(!text.contains("vulkan.rs"));
}

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(42)));
    }
}

// ============================================================================
// LOGGER TRAIT TESTS
// ============================================================================

struct CountingLogger {
    logged_count: std::sync::Mutex<usize>,
}

impl Logger for CountingLogger {
    fn log(&self, _entry: &LogEntry) {
        *self.logged_count.lock().unwrap() += 1;
    }
}

#[test]
fn test_custom_logger_implementation() {
    let logger = CountingLogger { logged_count: std::sync::Mutex::new(0) };
    logger.log(&entry(LogSeverity::Info, None, None));
    logger.log(&entry(LogSeverity::Debug, None, None));
    assert_eq!(*logger.logged_count.lock().unwrap(), 2);
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}
