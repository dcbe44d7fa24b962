//! Activity command - recent jobs and queue state.

use anyhow::Result;
use crawldeck_fetch::CancelSignal;

use super::{connect, print_json, wants_json};
use crate::Cli;
use crate::output::TextFormatter;

/// Runs the activity command.
pub async fn run(cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let session = connect(cli, signal).await?;
    let items = session.client.activity(&session.options).await?;

    if wants_json(cli) {
        return print_json(&items, cli);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_activity(&items, None));
    Ok(())
}
