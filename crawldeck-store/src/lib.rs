// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Crawldeck Store
//!
//! Local connection settings for Crawldeck.
//!
//! This crate provides:
//!
//! - **SettingsStore**: Base URL, API key and theme with persistence and
//!   change notification
//! - **Base URL helpers**: Validation and normalization of what the user
//!   typed
//! - **Persistence**: Owner-only, atomic JSON file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use crawldeck_fetch::CrawlClient;
//! use crawldeck_store::SettingsStore;
//!
//! let settings = SettingsStore::load_default().await;
//! settings.set_base_url("http://localhost:3002/").await;
//! settings.save().await?;
//!
//! let client = CrawlClient::new(settings.client_config().await?)?;
//! ```

pub mod error;
pub mod persistence;
pub mod settings_store;

pub use error::{BaseUrlError, StoreError};
pub use persistence::{
    default_config_dir, default_settings_path, load_json, load_json_or_default, save_json,
};
pub use settings_store::{Settings, SettingsStore, Theme, normalize_base_url, validate_base_url};
#[cfg(test)]
mod persistence_tests;
