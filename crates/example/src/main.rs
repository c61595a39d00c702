//! Example dashboard CLI.
//!
//! Polls a simulated CPU gauge for a while, renders a summary, then tears
//! the panel down.
//!
//! # Usage
//!
//! ```bash
//! dashboard [samples]
//! ```

use std::time::Duration;

use autorelease_extras::{TracingConfig, TracingFormat};
use example::MetricsPanel;
use tracing::Level;

const POLL_PERIOD: Duration = Duration::from_millis(50);

fn start(panel: &MetricsPanel) -> Result<(), Box<dyn std::error::Error>> {
    panel.follow_cpu()?;
    panel.start_polling(POLL_PERIOD)?;
    panel.watch_threshold(90)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    TracingConfig::new()
        .with_level(Level::DEBUG)
        .with_format(TracingFormat::Compact)
        .init();

    let samples = match std::env::args().nth(1).map(|arg| arg.parse::<usize>()) {
        None => 20,
        Some(Ok(samples)) => samples,
        Some(Err(e)) => {
            eprintln!("Usage: dashboard [samples]");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut panel = MetricsPanel::new("cpu");
    if let Err(e) = start(&panel) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    while panel.history().len() <= samples {
        tokio::time::sleep(POLL_PERIOD).await;
    }
    tracing::info!(summary = %panel.render(), "rendered");

    match panel.on_destroy() {
        Ok(recorded) => tracing::info!(recorded, "dashboard closed"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
