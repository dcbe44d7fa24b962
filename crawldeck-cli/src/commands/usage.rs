//! Usage command - credit and token quota.

use anyhow::Result;
use crawldeck_fetch::CancelSignal;

use super::{connect, print_json, wants_json};
use crate::Cli;
use crate::output::TextFormatter;

/// Runs the usage command.
pub async fn run(cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let session = connect(cli, signal).await?;
    let usage = session.client.usage(&session.options).await?;

    if wants_json(cli) {
        return print_json(&usage, cli);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_usage(&usage));
    Ok(())
}
