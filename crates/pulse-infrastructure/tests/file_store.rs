use std::path::PathBuf;
use std::sync::Arc;

use pulse_core::domain::PersistedAuthState;
use pulse_core::ports::SessionStore;
use pulse_core::SessionManager;
use pulse_infrastructure::{FileSessionStore, OfflineBackend};
use uuid::Uuid;

fn temp_store() -> (FileSessionStore, PathBuf) {
    let dir = std::env::temp_dir().join(format!("gympulse-test-{}", Uuid::new_v4()));
    let path = dir.join("auth-storage.json");
    (FileSessionStore::new(&path), dir)
}

#[test]
fn missing_file_loads_nothing() {
    let (store, dir) = temp_store();
    assert_eq!(store.load().unwrap(), None);
    assert!(store.clear().is_ok());
    assert!(!dir.exists());
}

#[test]
fn record_uses_envelope_layout() {
    let (store, dir) = temp_store();
    let state = PersistedAuthState {
        access_token: Some("a.b.c".to_string()),
        user: None,
        is_authenticated: true,
    };

    store.save(&state).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["version"], 0);
    assert_eq!(raw["state"]["accessToken"], "a.b.c");
    assert_eq!(raw["state"]["isAuthenticated"], true);
    assert_eq!(store.load().unwrap(), Some(state));

    store.clear().unwrap();
    assert!(!store.path().exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn corrupt_record_is_an_error() {
    let (store, dir) = temp_store();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(store.path(), "{not json").unwrap();

    assert!(store.load().is_err());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn unknown_version_is_ignored() {
    let (store, dir) = temp_store();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        store.path(),
        r#"{"state":{"accessToken":"a.b.c","user":null,"isAuthenticated":true},"version":3}"#,
    )
    .unwrap();

    assert_eq!(store.load().unwrap(), None);
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn session_survives_restart() {
    let (store, dir) = temp_store();
    let store = Arc::new(store);
    let backend = Arc::new(OfflineBackend::demo());

    let first = SessionManager::new(backend.clone(), store.clone());
    first.login("owner", "secret").await.unwrap();

    let second = SessionManager::new(backend.clone(), store.clone());
    assert!(second.restore());
    assert_eq!(second.identity().unwrap().username, "owner");

    second.logout();
    assert_eq!(store.load().unwrap(), None);
    let third = SessionManager::new(backend, store);
    assert!(!third.restore());
    std::fs::remove_dir_all(dir).ok();
}
