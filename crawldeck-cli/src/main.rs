// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Crawldeck CLI - console for a self-hosted scraping server.
//!
//! # Examples
//!
//! ```bash
//! # Check the server (default command)
//! crawldeck --base-url http://localhost:3002
//!
//! # Scrape a page as markdown and html
//! crawldeck scrape https://example.com --formats markdown,html
//!
//! # Recent jobs and quota
//! crawldeck activity
//! crawldeck usage --format json --pretty
//!
//! # Save connection settings
//! crawldeck config set --url http://localhost:3002 --key fc-...
//!
//! # Watch mode
//! crawldeck watch --interval 15
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crawldeck_core::CoreError;
use crawldeck_fetch::{CancelSignal, ClientError, ErrorKind};
use crawldeck_store::StoreError;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{activity, changelog, config, health, jobs, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// Crawldeck CLI - console for a self-hosted scraping server.
#[derive(Parser)]
#[command(name = "crawldeck")]
#[command(about = "Console for a self-hosted scraping server")]
#[command(long_about = r#"
Crawldeck talks to a self-hosted scraping server. Older servers that lack
the /v2 health, activity or usage endpoints are detected automatically and
their legacy endpoints are used instead.

Connection settings come from, in order: command-line flags, the
CRAWLDECK_BASE_URL / CRAWLDECK_API_KEY environment variables, and the
saved settings file (see `crawldeck config path`).

Examples:
  crawldeck                              # Server health
  crawldeck scrape https://example.com   # Scrape one page
  crawldeck activity                     # Recent jobs
  crawldeck usage --format json          # Quota as JSON
  crawldeck watch                        # Live dashboard
"#)]
#[command(version)]
#[command(author = "Crawldeck Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'health' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL (overrides saved settings).
    #[arg(long, env = "CRAWLDECK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key (overrides saved settings).
    #[arg(long, env = "CRAWLDECK_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long, short = 't', global = true)]
    pub timeout: Option<u64>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Check server health (default if no command specified).
    #[command(visible_alias = "h")]
    Health(health::HealthArgs),

    /// Scrape a single page.
    Scrape(jobs::ScrapeArgs),

    /// Search the web.
    Search(jobs::SearchArgs),

    /// Start a crawl.
    Crawl(jobs::CrawlArgs),

    /// Extract structured data from pages.
    Extract(jobs::ExtractArgs),

    /// List recent jobs.
    #[command(visible_alias = "a")]
    Activity,

    /// Show credit and token usage.
    #[command(visible_alias = "u")]
    Usage,

    /// Show the server changelog.
    Changelog,

    /// Watch health, activity and usage.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage saved settings.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// The server does not offer the operation.
    Unsupported = 2,
    /// Invalid input or an unreadable response.
    InvalidInput = 3,
    /// Timeout.
    Timeout = 4,
    /// Interrupted.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if let Some(client) = error.downcast_ref::<ClientError>() {
            return match client.kind() {
                ErrorKind::Timeout => Self::Timeout,
                ErrorKind::Cancelled => Self::Cancelled,
                ErrorKind::Serialization => Self::InvalidInput,
                ErrorKind::HttpStatus if client.is_not_found() => Self::Unsupported,
                ErrorKind::HttpStatus | ErrorKind::Network => Self::Error,
            };
        }
        if error.downcast_ref::<CoreError>().is_some() {
            return Self::InvalidInput;
        }
        match error.downcast_ref::<StoreError>() {
            Some(store) if store.is_config_error() => Self::InvalidInput,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("crawldeck=debug,info")
    } else {
        EnvFilter::new("crawldeck=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Cancels `signal` on Ctrl+C.
fn cancel_on_interrupt(signal: &CancelSignal) {
    let signal = signal.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            signal.cancel_with_reason("Interrupted");
        }
    });
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let signal = CancelSignal::new();
    cancel_on_interrupt(&signal);

    let result = match &cli.command {
        Some(Commands::Health(args)) => health::run(args, &cli, &signal).await,
        Some(Commands::Scrape(args)) => jobs::scrape(args, &cli, &signal).await,
        Some(Commands::Search(args)) => jobs::search(args, &cli, &signal).await,
        Some(Commands::Crawl(args)) => jobs::crawl(args, &cli, &signal).await,
        Some(Commands::Extract(args)) => jobs::extract(args, &cli, &signal).await,
        Some(Commands::Activity) => activity::run(&cli, &signal).await,
        Some(Commands::Usage) => usage::run(&cli, &signal).await,
        Some(Commands::Changelog) => changelog::run(&cli, &signal).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli, &signal).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => health::run(&health::HealthArgs::default(), &cli, &signal).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
