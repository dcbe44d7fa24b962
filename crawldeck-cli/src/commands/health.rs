//! Health command - probe the server, with legacy fallbacks.

use anyhow::Result;
use clap::Args;
use crawldeck_fetch::CancelSignal;
use tracing::info;

use super::{connect, wants_json};
use crate::Cli;
use crate::output::{JsonFormatter, TextFormatter};

/// Arguments for the health command.
#[derive(Args, Default)]
pub struct HealthArgs {
    /// Show every endpoint that was probed.
    #[arg(long)]
    pub attempts: bool,
}

/// Runs the health command.
pub async fn run(args: &HealthArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let session = connect(cli, signal).await?;
    let outcome = session.client.health_detailed(&session.options).await;

    if let Some(endpoint) = outcome.answered_by() {
        info!(endpoint, fallback = outcome.used_fallback(), "Health answered");
    }

    if wants_json(cli) {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_health(&outcome)?);
        // Exit status still reflects the failure
        return outcome.into_result().map(|_| ()).map_err(Into::into);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    if args.attempts || cli.verbose {
        println!("{}", formatter.format_attempts(&outcome.attempts));
        println!();
    }

    let health = outcome.into_result()?;
    println!("{}", formatter.format_health(&health));
    Ok(())
}
