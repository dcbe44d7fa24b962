//! Config command - manage saved connection settings.

use anyhow::Result;
use clap::{Args, Subcommand};
use crawldeck_store::{
    SettingsStore, StoreError, Theme, default_config_dir, default_settings_path, validate_base_url,
};
use serde::Serialize;
use tracing::info;

use super::{print_json, wants_json};
use crate::Cli;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current settings (the API key is masked).
    Show,

    /// Show configuration paths.
    Path,

    /// Update settings.
    Set {
        /// Server base URL.
        #[arg(long)]
        url: Option<String>,

        /// API key; pass an empty string to remove it.
        #[arg(long)]
        key: Option<String>,

        /// Color theme (dark or light).
        #[arg(long)]
        theme: Option<Theme>,
    },

    /// Reset to defaults.
    Reset,
}

/// Settings as shown to the user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView {
    base_url: String,
    normalized_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Set { url, key, theme } => {
            set_config(url.as_deref(), key.as_deref(), *theme).await
        }
        ConfigAction::Reset => reset_config().await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await;
    let settings = store.get().await;
    let view = SettingsView {
        base_url: settings.base_url.clone(),
        normalized_base_url: settings.normalized_base_url(),
        api_key: settings.masked_api_key(),
        theme: settings.theme,
        problem: validate_base_url(&settings.normalized_base_url())
            .err()
            .map(|e| e.to_string()),
    };

    if wants_json(cli) {
        return print_json(&view, cli);
    }

    println!("Crawldeck Configuration");
    println!("{}", "─".repeat(40));
    println!();
    println!(
        "Base URL: {}",
        if view.base_url.is_empty() { "(not set)" } else { view.normalized_base_url.as_str() }
    );
    println!("API key:  {}", view.api_key.as_deref().unwrap_or("(none)"));
    println!("Theme:    {}", view.theme);
    if let Some(problem) = &view.problem {
        println!();
        println!("Warning: {problem}");
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();

    if wants_json(cli) {
        let paths = serde_json::json!({
            "config_dir": config_dir.display().to_string(),
            "settings_file": settings_path.display().to_string(),
        });
        return print_json(&paths, cli);
    }

    println!("Configuration Paths");
    println!("{}", "─".repeat(40));
    println!();
    println!("Config dir:    {}", config_dir.display());
    println!("Settings file: {}", settings_path.display());

    Ok(())
}

async fn set_config(
    base_url: Option<&str>,
    api_key: Option<&str>,
    theme: Option<Theme>,
) -> Result<()> {
    if base_url.is_none() && api_key.is_none() && theme.is_none() {
        anyhow::bail!("Nothing to set. Use --url, --key or --theme");
    }

    let store = SettingsStore::load_default().await;

    if let Some(base_url) = base_url {
        validate_base_url(base_url).map_err(StoreError::from)?;
        store.set_base_url(base_url).await;
        println!("Base URL set to: {}", store.normalized_base_url().await);
    }
    if let Some(api_key) = api_key {
        store.set_api_key(api_key.trim()).await;
        if api_key.trim().is_empty() {
            println!("API key removed");
        } else {
            println!("API key saved");
        }
    }
    if let Some(theme) = theme {
        store.set_theme(theme).await;
        println!("Theme set to: {theme}");
    }

    store.save().await?;
    info!(path = %store.path().display(), "Settings updated");

    Ok(())
}

async fn reset_config() -> Result<()> {
    let path = default_settings_path();
    let existed = path.exists();

    SettingsStore::new(path).clear().await?;

    if existed {
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
