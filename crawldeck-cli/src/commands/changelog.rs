//! Changelog command.

use anyhow::Result;
use crawldeck_fetch::CancelSignal;

use super::{connect, print_json, wants_json};
use crate::Cli;
use crate::output::TextFormatter;

/// Runs the changelog command.
pub async fn run(cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let session = connect(cli, signal).await?;
    let changelog = session.client.changelog(&session.options).await?;

    if wants_json(cli) {
        return print_json(&changelog, cli);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_changelog(&changelog));
    Ok(())
}
