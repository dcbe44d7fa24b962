//! Watch command - live health, activity and usage.
//!
//! Each section is polled independently. A section whose endpoint the
//! server lacks stops polling and is shown as unsupported; the others keep
//! refreshing.

use std::io::{Write, stdout};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use crawldeck_fetch::{CancelSignal, ClientError, CrawlClient, PollState, Poller, RequestOptions};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::info;

use super::{connect, wants_json};
use crate::Cli;
use crate::output::{JsonFormatter, TextFormatter, WatchOutput};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds.
    #[arg(long, short, default_value = "30")]
    pub interval: u64,

    /// Minimum interval to use.
    #[arg(long, default_value = "5")]
    pub min_interval: u64,

    /// Number of activity rows to show.
    #[arg(long, default_value = "10")]
    pub rows: usize,
}

/// Starts a poller for one client operation.
fn poll<T, F, Fut>(
    client: &Arc<CrawlClient>,
    options: &RequestOptions,
    period: Duration,
    fetch: F,
) -> Poller<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Arc<CrawlClient>, RequestOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    let client = Arc::clone(client);
    let options = options.clone();
    Poller::spawn(period, move |tick| {
        // Each tick gets its own signal; the timeout carries over
        let tick_options = RequestOptions {
            signal: Some(tick),
            ..options.clone()
        };
        fetch(Arc::clone(&client), tick_options)
    })
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli, signal: &CancelSignal) -> Result<()> {
    let refresh_interval = args.interval.max(args.min_interval);
    let period = Duration::from_secs(refresh_interval);

    let session = connect(cli, signal).await?;
    let base_url = session.client.config().base_url().to_string();
    let client = Arc::new(session.client);

    info!(interval = refresh_interval, base_url = %base_url, "Starting watch mode");

    let health = poll(&client, &session.options, period, |c, o| async move {
        c.health(&o).await
    });
    let activity = poll(&client, &session.options, period, |c, o| async move {
        c.activity(&o).await
    });
    let usage = poll(&client, &session.options, period, |c, o| async move {
        c.usage(&o).await
    });

    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(cli.pretty);

    let mut redraw = interval(Duration::from_millis(250));
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_drawn: Option<[Drawn; 3]> = None;

    loop {
        tokio::select! {
            () = signal.cancelled() => break,
            _ = redraw.tick() => {}
        }

        let (h, a, u) = (health.state(), activity.state(), usage.state());
        let drawn = [Drawn::of(&h), Drawn::of(&a), Drawn::of(&u)];
        if last_drawn.as_ref() == Some(&drawn) {
            continue;
        }
        last_drawn = Some(drawn);

        if wants_json(cli) {
            let output = WatchOutput {
                updated_at: Utc::now(),
                health: JsonFormatter::section(&h),
                activity: JsonFormatter::section(&a),
                usage: JsonFormatter::section(&u),
            };
            println!("{}", json.format(&output)?);
        } else {
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;
            println!(
                "Crawldeck Watch - {} (refresh: {}s)",
                chrono::Local::now().format("%H:%M:%S"),
                refresh_interval
            );
            println!("{}", text.format_placeholder(&base_url));
            println!();
            println!("{}", render_section(&text, "Health", &h, |d| text.format_health(d)));
            println!();
            println!("{}", render_section(&text, "Usage", &u, |d| text.format_usage(d)));
            println!();
            println!(
                "{}",
                render_section(&text, "Activity", &a, |d| text.format_activity(d, Some(args.rows)))
            );
            println!();
            println!("Press Ctrl+C to exit");
        }

        if !(h.is_active || a.is_active || u.is_active) {
            info!("Nothing left to poll");
            break;
        }
    }

    health.stop();
    activity.stop();
    usage.stop();
    Ok(())
}

/// What the screen last showed for one section.
#[derive(PartialEq)]
struct Drawn {
    updated: Option<DateTime<Utc>>,
    error: Option<String>,
    active: bool,
}

impl Drawn {
    fn of<T>(state: &PollState<T>) -> Self {
        Self {
            updated: state.last_updated,
            error: state.error.as_ref().map(ToString::to_string),
            active: state.is_active,
        }
    }
}

fn render_section<T>(
    formatter: &TextFormatter,
    title: &str,
    state: &PollState<T>,
    body: impl Fn(&T) -> String,
) -> String {
    let mut lines = vec![formatter.format_header(title)];

    if state.is_unsupported() {
        lines.push(formatter.format_unsupported(title));
        return lines.join("\n");
    }
    match &state.data {
        Some(data) => lines.push(body(data)),
        None if state.error.is_none() => lines.push(formatter.format_placeholder("Loading...")),
        None => {}
    }
    if let Some(error) = &state.error {
        lines.push(formatter.format_error(title, &error.to_string()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_section_states() {
        let formatter = TextFormatter::new(false);

        let loading: PollState<u32> = PollState::default();
        assert!(render_section(&formatter, "Usage", &loading, u32::to_string).contains("Loading..."));

        let unsupported: PollState<u32> = PollState {
            error: Some(ClientError::not_found("Not Found")),
            is_active: false,
            ..PollState::default()
        };
        let output = render_section(&formatter, "Activity", &unsupported, u32::to_string);
        assert!(output.contains("Activity: Not supported by this server"));

        let stale: PollState<u32> = PollState {
            data: Some(7),
            error: Some(ClientError::Timeout),
            ..PollState::default()
        };
        let output = render_section(&formatter, "Usage", &stale, u32::to_string);
        assert!(output.contains('7'));
        assert!(output.contains("Usage: Error - Request timed out"));
    }
}
