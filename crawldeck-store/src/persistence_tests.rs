//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations and settings store persistence.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{load_json, load_json_or_default, save_json};
use crate::settings_store::{Settings, SettingsStore, Theme};

fn sample() -> Settings {
    Settings {
        base_url: "http://localhost:3002/".to_string(),
        api_key: "fc-local".to_string(),
        theme: Theme::Light,
    }
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    save_json(&file_path, &sample()).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, sample());
}

#[tokio::test]
async fn test_wire_keys_are_camel_case() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    save_json(&file_path, &sample()).await.unwrap();
    let raw: serde_json::Value = load_json(&file_path).await.unwrap();

    assert_eq!(raw["baseUrl"], "http://localhost:3002/");
    assert_eq!(raw["apiKey"], "fc-local");
    assert_eq!(raw["theme"], "light");
}

#[tokio::test]
async fn test_save_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("crawldeck").join("settings.json");

    save_json(&nested_path, &serde_json::json!({"baseUrl": ""})).await.unwrap();
    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());

    let settings: Settings = load_json_or_default(&file_path).await;
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_corrupt_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let store = SettingsStore::load(file_path).await;
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"baseUrl": "https://crawl.example.com"}"#)
        .await
        .unwrap();

    let settings = SettingsStore::load(file_path).await.get().await;
    assert_eq!(settings.base_url, "https://crawl.example.com");
    assert_eq!(settings.api_key, "");
    assert_eq!(settings.theme, Theme::Dark);
}

#[cfg(unix)]
#[tokio::test]
async fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    save_json(&file_path, &sample()).await.unwrap();

    let mode = std::fs::metadata(&file_path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

// ============================================================================
// Settings Store Tests
// ============================================================================

#[tokio::test]
async fn test_store_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store.set_base_url("https://crawl.example.com/?debug=1").await;
    store.set_api_key("fc-secret").await;
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(file_path).await;
    assert_eq!(
        reloaded.normalized_base_url().await,
        "https://crawl.example.com"
    );
    let config = reloaded.client_config().await.unwrap();
    assert_eq!(config.url("/v2/health"), "https://crawl.example.com/v2/health");
    assert_eq!(config.api_key(), Some("fc-secret"));
}

#[tokio::test]
async fn test_clear_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store.update(|s| *s = sample()).await;
    store.save().await.unwrap();
    assert!(file_path.exists());

    store.clear().await.unwrap();
    assert!(!file_path.exists());
    assert_eq!(store.get().await, Settings::default());

    // Clearing twice is fine.
    store.clear().await.unwrap();
}
