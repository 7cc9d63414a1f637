//! File mode through the logger facade

use duolog::test_support::CaptureConsole;
use duolog::{HandleState, Level, Logger, LoggerConfig, Mode};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn file_logger(dir: &Path, file: &str, capture: &CaptureConsole) -> Logger {
    let config = LoggerConfig::builder()
        .mode(Mode::File)
        .base_dir(dir)
        .file_path(file)
        .build()
        .unwrap();

    Logger::with_console(config, Arc::new(capture.clone())).unwrap()
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .split_inclusive('\n')
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_lines_appended_in_call_order() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "out.log", &capture);

    logger.log("a");
    logger.log("b");
    tokio::time::sleep(Duration::from_millis(200)).await;

    let lines = read_lines(&dir.path().join("out.log"));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[INFO, "));
    assert!(lines[0].ends_with("]: a \n"));
    assert!(lines[1].starts_with("[INFO, "));
    assert!(lines[1].ends_with("]: b \n"));
    assert!(capture.is_empty());

    logger.shutdown().await;
}

#[tokio::test]
async fn test_nothing_written_synchronously() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "lazy.log", &capture);

    logger.log("queued");

    let sink = logger.file_sink().unwrap();
    assert_eq!(sink.pending(), 1);
    assert_eq!(sink.handle_state(), HandleState::Closed);
    assert!(!dir.path().join("lazy.log").exists());

    logger.shutdown().await;
}

#[tokio::test]
async fn test_bare_message_matches_info_record() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "same.log", &capture);

    logger.log("x");
    logger.log((Level::Info, "x"));
    logger.shutdown().await;

    let lines = read_lines(&dir.path().join("same.log"));
    assert_eq!(lines.len(), 2);
    // Timestamps may differ by a tick; everything around them matches
    let strip = |line: &str| line.split_once("]:").map(|(_, rest)| rest.to_string());
    assert_eq!(strip(&lines[0]), strip(&lines[1]));
    assert!(lines[0].starts_with("[INFO, "));
    assert!(lines[1].starts_with("[INFO, "));
}

#[tokio::test]
async fn test_levels_in_file() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "levels.log", &capture);

    logger.warn("careful");
    logger.log_value(&json!({"level": "error", "message": "boom"}));
    logger.shutdown().await;

    let lines = read_lines(&dir.path().join("levels.log"));
    assert!(lines[0].starts_with("[WARN, "));
    assert!(lines[0].ends_with("]: careful \n"));
    assert!(lines[1].starts_with("[ERROR, "));
    assert!(lines[1].ends_with("]: boom \n"));
    // File mode never touches the console for successful writes
    assert!(capture.is_empty());
}

#[tokio::test]
async fn test_unsupported_values_ignored() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "ignored.log", &capture);

    logger.log_value(&json!(null));
    logger.log_value(&json!(42));
    logger.log_value(&json!({"level": "debug", "message": "nope"}));
    assert_eq!(logger.file_sink().unwrap().pending(), 0);

    assert_eq!(logger.shutdown().await, 0);
    assert!(!dir.path().join("ignored.log").exists());
}

#[tokio::test]
async fn test_handle_closes_after_idle_window() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "idle.log", &capture);

    logger.log("a");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(logger.file_sink().unwrap().handle_state(), HandleState::Open);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(
        logger.file_sink().unwrap().handle_state(),
        HandleState::Closed
    );

    logger.log("b");
    logger.shutdown().await;

    assert_eq!(logger.file_sink().unwrap().opens(), 2);
    assert_eq!(read_lines(&dir.path().join("idle.log")).len(), 2);
}

#[tokio::test]
async fn test_shutdown_persists_everything() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "burst.log", &capture);

    for i in 0..175 {
        logger.log(format!("line {i}"));
    }
    assert_eq!(logger.shutdown().await, 175);

    let lines = read_lines(&dir.path().join("burst.log"));
    assert_eq!(lines.len(), 175);
    assert!(lines[174].ends_with("]: line 174 \n"));
    assert_eq!(
        logger.file_sink().unwrap().handle_state(),
        HandleState::Closed
    );
}

#[tokio::test]
async fn test_missing_path_reported_on_console() {
    let capture = CaptureConsole::new();
    let config = LoggerConfig::builder().mode(Mode::File).build().unwrap();
    let logger = Logger::with_console(config, Arc::new(capture.clone())).unwrap();

    logger.log("lost");
    tokio::time::sleep(Duration::from_millis(150)).await;

    let errors = capture.lines_at(Level::Error);
    assert!(!errors.is_empty());
    assert!(errors[0].starts_with("\x1b[31m"));
    assert!(capture.contains("no log file path configured"));
    assert_eq!(logger.file_sink().unwrap().pending(), 1);
}

#[tokio::test]
async fn test_relative_path_resolves_against_base_dir() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "nested.log", &capture);

    logger.info("here");
    logger.flush().await;

    assert!(dir.path().join("nested.log").is_file());
    logger.shutdown().await;
}

#[tokio::test]
async fn test_log_after_shutdown_is_dropped() {
    let dir = tempdir().unwrap();
    let capture = CaptureConsole::new();
    let logger = file_logger(dir.path(), "closed.log", &capture);

    logger.log("before");
    logger.shutdown().await;
    logger.log("after");

    let sink = logger.file_sink().unwrap();
    assert_eq!(sink.pending(), 0);
    assert_eq!(sink.dropped(), 1);

    let lines = read_lines(&dir.path().join("closed.log"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("]: before \n"));
}
