use autoquery::logger;
use tempfile::tempdir;

#[test]
fn configure_logging_creates_log_files() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    logger::configure_logging(Some(&logs), Some("debug"), Some(3)).unwrap();
    assert!(logs.join("app.log").exists());
    assert!(logs.join("dropped.log").exists());

    // A second call must not fail even though a logger is already installed.
    let again = dir.path().join("again");
    logger::configure_logging(Some(&again), Some("TRACE"), None).unwrap();
    assert!(again.join("app.log").exists());
}

#[test]
fn missing_config_file_is_a_logger_error() {
    let dir = tempdir().unwrap();
    let err = logger::init_file(&dir.path().join("log4rs.yaml")).unwrap_err();
    assert!(matches!(err, autoquery::QueryError::Logger(_)));
}
