//! Durable credentials and configuration loading.

mod common;

use std::sync::Arc;

use common::{FakeBackend, harness};
use tictactoe_webapp::AppConfig;
use tictactoe_webapp::auth::{CredentialStorage, Credentials, FileStorage, TOKEN_KEY};

#[test]
fn test_file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.toml");

    let storage = FileStorage::open(&path).unwrap();
    let mut credentials = Credentials::new("alice".into(), "t-1".into(), 4_102_444_800);
    credentials.in_competition = true;
    credentials.store(&storage).unwrap();
    drop(storage);

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(Credentials::load(&reopened, 0), Some(credentials));

    Credentials::clear(&reopened).unwrap();
    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.get(TOKEN_KEY), None);
}

#[test]
fn test_corrupt_storage_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.toml");
    std::fs::write(&path, "username = [").unwrap();

    assert!(FileStorage::open(&path).is_err());
}

#[tokio::test]
async fn test_expired_credentials_are_ignored_by_the_app() {
    let h = harness("/", FakeBackend::new());
    Credentials::new("alice".into(), "old".into(), 1)
        .store(&*h.storage)
        .unwrap();

    assert!(h.app.credentials().is_none());
    h.app.start().await;
    assert!(h.surface.find_clickable("Play as guest").is_some());
}

#[tokio::test]
async fn test_set_credentials_persists_to_storage() {
    let h = harness("/", FakeBackend::new());
    let storage: Arc<dyn CredentialStorage> = h.storage.clone();

    h.app.set_credentials(Some(Credentials::new(
        "bob".into(),
        "t-9".into(),
        4_102_444_800,
    )));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t-9"));

    h.app.set_credentials(None);
    assert_eq!(storage.get(TOKEN_KEY), None);
    assert!(h.app.credentials().is_none());
}

#[test]
fn test_config_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tictactoe.toml");
    std::fs::write(&path, "server_url = \"http://games.test\"\nstart_url = \"/users\"\n").unwrap();

    let config = AppConfig::from_file(&path).unwrap();

    assert_eq!(config.server_url(), "http://games.test");
    assert_eq!(config.start_url(), "/users");
    assert_eq!(config.automated_opponent(), "bot");
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let config = AppConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.start_url(), "/");
}
