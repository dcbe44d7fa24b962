//! Connection settings store.
//!
//! Holds the server base URL, the API key and the theme preference, with
//! persistence and change notification.

use crawldeck_fetch::ClientConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};
use url::Url;

use crate::error::{BaseUrlError, StoreError};
use crate::persistence::{default_settings_path, load_json_or_default, remove_file, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

impl Theme {
    /// Returns the stored name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("Unknown theme: {other}")),
        }
    }
}

// Anything but "light" reads as dark.
impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(if raw.as_str() == Some("light") {
            Self::Light
        } else {
            Self::Dark
        })
    }
}

/// Stored connection settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Server base URL as entered.
    pub base_url: String,
    /// API key as entered; blank means none.
    pub api_key: String,
    /// Theme preference.
    pub theme: Theme,
}

impl Settings {
    /// Base URL without query, fragment or trailing slash.
    ///
    /// Returns the trimmed input unchanged if it does not parse.
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    /// Returns true if an API key is set.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return None;
        }
        let chars: Vec<char> = key.chars().collect();
        let visible = chars.len().saturating_sub(4);
        Some(
            chars
                .iter()
                .enumerate()
                .map(|(i, c)| if i < visible { '*' } else { *c })
                .collect(),
        )
    }

    /// Builds the client configuration from these settings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidBaseUrl` if the base URL is unusable.
    pub fn client_config(&self) -> Result<ClientConfig, StoreError> {
        let base_url = self.normalized_base_url();
        validate_base_url(&base_url)?;
        Ok(ClientConfig::from_parts(base_url, Some(&self.api_key)))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.masked_api_key())
            .field("theme", &self.theme)
            .finish()
    }
}

// ============================================================================
// Base URL Helpers
// ============================================================================

/// Checks that a base URL is present, parses, and uses http or https.
///
/// # Errors
///
/// Returns the reason the URL was rejected.
pub fn validate_base_url(value: &str) -> Result<Url, BaseUrlError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BaseUrlError::Missing);
    }
    let url = Url::parse(value).map_err(|_| BaseUrlError::Invalid)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(BaseUrlError::UnsupportedScheme),
    }
}

/// Drops query and fragment and strips a trailing slash from the path.
pub fn normalize_base_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let path = url.path().trim_end_matches('/').to_string();
            url.set_path(&path);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings that saves to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing or corrupt file yields defaults.
    pub async fn load(path: PathBuf) -> Self {
        info!(path = %path.display(), "Loading settings");
        let settings = load_json_or_default(&path).await;
        Self::with_settings(path, settings)
    }

    /// File the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Sets the base URL as entered.
    pub async fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.update(|s| s.base_url = base_url).await;
    }

    /// Sets the API key.
    pub async fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.update(|s| s.api_key = api_key).await;
    }

    /// Sets the theme.
    pub async fn set_theme(&self, theme: Theme) {
        self.update(|s| s.theme = theme).await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Resets to defaults and deletes the settings file.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.update(|s| *s = Settings::default()).await;
        remove_file(&self.path).await?;
        info!(path = %self.path.display(), "Settings cleared");
        Ok(())
    }

    /// Normalized base URL of the current settings.
    pub async fn normalized_base_url(&self) -> String {
        self.settings.read().await.normalized_base_url()
    }

    /// Client configuration for the current settings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidBaseUrl` if the base URL is unusable.
    pub async fn client_config(&self) -> Result<ClientConfig, StoreError> {
        self.settings.read().await.client_config()
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
        debug!(version = *version, "Settings changed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert_eq!(validate_base_url(""), Err(BaseUrlError::Missing));
        assert_eq!(validate_base_url("not a url"), Err(BaseUrlError::Invalid));
        assert_eq!(
            validate_base_url("ftp://example.com"),
            Err(BaseUrlError::UnsupportedScheme)
        );
        assert!(validate_base_url("https://example.com").is_ok());
        assert!(validate_base_url("http://localhost:3002").is_ok());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(BaseUrlError::Missing.to_string(), "Base URL is required");
        assert_eq!(BaseUrlError::Invalid.to_string(), "Invalid URL");
        assert_eq!(
            BaseUrlError::UnsupportedScheme.to_string(),
            "URL must use http or https"
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://example.dev/"), "https://example.dev");
        assert_eq!(
            normalize_base_url(" https://example.dev/api/?x=1#top "),
            "https://example.dev/api"
        );
        assert_eq!(normalize_base_url("http://localhost:3002"), "http://localhost:3002");
        assert_eq!(normalize_base_url("  example.dev/api/ "), "example.dev/api/");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_theme_is_lenient() {
        let settings: Settings = serde_json::from_str(r#"{"theme": "light"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Light);

        let settings: Settings = serde_json::from_str(r#"{"theme": "solarized"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);

        let settings: Settings = serde_json::from_str(r#"{"theme": null}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_masked_api_key() {
        let settings = Settings {
            api_key: "fc-123456789".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.masked_api_key().as_deref(), Some("********6789"));
        assert!(!format!("{settings:?}").contains("fc-1234"));
        assert!(Settings::default().masked_api_key().is_none());
    }

    #[test]
    fn test_client_config_normalizes() {
        let settings = Settings {
            base_url: "https://example.dev/".to_string(),
            api_key: "  key  ".to_string(),
            theme: Theme::Dark,
        };
        let config = settings.client_config().unwrap();
        assert_eq!(config.base_url(), "https://example.dev");
        assert_eq!(config.api_key(), Some("key"));

        let blank = Settings {
            base_url: "https://example.dev".to_string(),
            api_key: "   ".to_string(),
            theme: Theme::Light,
        };
        assert!(!blank.client_config().unwrap().has_api_key());
    }

    #[test]
    fn test_client_config_rejects_missing_url() {
        let err = Settings::default().client_config().unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Base URL is required");
    }

    #[tokio::test]
    async fn test_update_notifies() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let rx = store.subscribe();

        store.set_base_url("http://localhost:3002").await;
        store.set_theme(Theme::Light).await;

        assert_eq!(*rx.borrow(), 2);
        assert_eq!(store.get().await.theme, Theme::Light);
    }
}
