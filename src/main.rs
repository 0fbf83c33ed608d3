//! request-watch
//!
//! Drives a request tracker from a line script on stdin and prints every
//! emitted signal as one JSON object per line on stdout.
//!
//! ```text
//!   stdin script ──▶ replay ──▶ RequestTracker ──▶ groups ──▶ signals ──▶ stdout (JSON)
//!                                     │
//!                                     └──▶ logs (stderr), metrics (Prometheus)
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use request_watch::config::{load_config, TrackerConfig};
use request_watch::lifecycle::signals::wait_for_signal;
use request_watch::observability::{logging, metrics};
use request_watch::replay::ReplayCommand;
use request_watch::RequestTracker;

#[derive(Parser)]
#[command(name = "request-watch")]
#[command(about = "Replay request start/finish events and print busy/idle signals", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// How long to keep running after stdin closes so pending timers fire.
    #[arg(long, default_value_t = 1000)]
    linger_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TrackerConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.observability.log_level.as_str());
    logging::init_logging(level);

    tracing::info!("request-watch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let tracker = RequestTracker::new(&config)?;
    let mut events = tracker.subscribe();

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!(error = %e, "Failed to encode signal"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Signal printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        result = drive(&tracker, Duration::from_millis(cli.linger_ms)) => result?,
        _ = wait_for_signal() => {}
    }

    tracker.shutdown();
    drop(tracker);
    printer.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn drive(tracker: &RequestTracker, linger: Duration) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match ReplayCommand::parse_line(&line) {
            Ok(Some(command)) => {
                if let Some(groups) = command.execute(tracker).await? {
                    println!("{}", json!({ "event": "status", "groups": groups }));
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(line = line_no, error = %e, "Skipping invalid line"),
        }
    }

    tracing::debug!(linger_ms = linger.as_millis() as u64, "Input closed, lingering");
    tokio::time::sleep(linger).await;
    Ok(())
}
