//! Loading queue configuration files

use std::io::Write;
use tempfile::NamedTempFile;
use tunnelq::queue::{ConfigError, QueueConfig, QueueKind, DEFAULT_QUEUE_CAPACITY};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let file = write_config("handshake_capacity = 16\nautodrain_send_timeout_ms = 0\n");

    let config = QueueConfig::load(file.path()).await.unwrap();

    assert_eq!(config.capacity(QueueKind::Handshake), 16);
    assert_eq!(config.capacity(QueueKind::Outbound), DEFAULT_QUEUE_CAPACITY);
    assert!(config.autodrain_send_timeout().is_zero());
}

#[tokio::test]
async fn test_explicit_file_wins_over_default_location() {
    let file = write_config("outbound_capacity = 2\n");

    let config = QueueConfig::load_or_default(Some(file.path())).await.unwrap();

    assert_eq!(config.outbound_capacity, 2);
}

#[tokio::test]
async fn test_unknown_key_is_a_parse_error() {
    let file = write_config("outbound_capacty = 2\n");

    match QueueConfig::load(file.path()).await {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_explicit_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let result = QueueConfig::load_or_default(Some(&missing)).await;

    assert!(matches!(result, Err(ConfigError::Io { .. })));
}
