//! Tests for `src/logging.rs`.

use ride_relay::config::LoggingConfig;
use ride_relay::logging::LoggingGuard;

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn file_logging_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // Only one global subscriber can be installed per process, so the
    // result is not asserted; the directory is created before that step.
    let config = LoggingConfig {
        dir: Some(logs_dir.clone()),
    };
    let _result = ride_relay::logging::init(&config);
    assert!(logs_dir.exists(), "logs directory should be created");
}
