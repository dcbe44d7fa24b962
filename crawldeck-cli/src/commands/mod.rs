//! CLI command implementations.

pub mod activity;
pub mod changelog;
pub mod config;
pub mod health;
pub mod jobs;
pub mod usage;
pub mod watch;

use std::time::Duration;

use anyhow::Result;
use crawldeck_fetch::{CancelSignal, CrawlClient, RequestOptions};
use crawldeck_store::{Settings, SettingsStore};
use serde::Serialize;
use tracing::debug;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

// ============================================================================
// Connection
// ============================================================================

/// A configured client plus the options every request of one command uses.
pub struct Session {
    /// The API client.
    pub client: CrawlClient,
    /// Cancellation and timeout for each request.
    pub options: RequestOptions,
}

/// Saved settings with command-line and environment overrides applied.
pub async fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = SettingsStore::load_default().await.get().await;
    if let Some(base_url) = &cli.base_url {
        settings.base_url.clone_from(base_url);
    }
    if let Some(api_key) = &cli.api_key {
        settings.api_key.clone_from(api_key);
    }
    settings
}

/// Request options for `signal` and the `--timeout` flag.
pub fn request_options(cli: &Cli, signal: &CancelSignal) -> RequestOptions {
    let options = RequestOptions::new().with_signal(signal.clone());
    match cli.timeout {
        Some(0) => options.without_timeout(),
        Some(secs) => options.with_timeout(Duration::from_secs(secs)),
        None => options,
    }
}

/// Builds the client from the resolved settings.
pub async fn connect(cli: &Cli, signal: &CancelSignal) -> Result<Session> {
    let settings = resolve_settings(cli).await;
    let config = settings.client_config()?;
    debug!(base_url = %config.base_url(), has_key = config.has_api_key(), "Connecting");

    Ok(Session {
        client: CrawlClient::new(config)?,
        options: request_options(cli, signal),
    })
}

/// Prints `value` as JSON.
pub fn print_json<T: Serialize>(value: &T, cli: &Cli) -> Result<()> {
    let formatter = JsonFormatter::new(cli.pretty);
    println!("{}", formatter.format(value)?);
    Ok(())
}

/// Returns true if the command should print JSON.
pub fn wants_json(cli: &Cli) -> bool {
    cli.format == OutputFormat::Json
}
