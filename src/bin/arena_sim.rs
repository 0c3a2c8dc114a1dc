//! Headless arena simulation.
//!
//! Usage: `arena_sim [config.json]`. Metrics are printed as JSON on stdout,
//! logs go to stderr (`RUST_LOG` controls verbosity).

use std::thread;

use anyhow::{Context, Result};
use arena_ai::sim::{RunnerConfig, SimulationRunner, TickReport};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Telemetry reports buffered before the simulation starts dropping them
const TELEMETRY_BUFFER: usize = 1024;
const TELEMETRY_LOG_EVERY: u64 = 600;

fn main() -> Result<()> {
    setup_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => RunnerConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => RunnerConfig::default(),
    };

    let (tx, rx) = crossbeam_channel::bounded::<TickReport>(TELEMETRY_BUFFER);
    let telemetry = thread::spawn(move || {
        let mut received = 0u64;
        for report in rx {
            received += 1;
            if report.tick % TELEMETRY_LOG_EVERY == 0 {
                tracing::debug!(
                    tick = report.tick,
                    timer = report.timer,
                    messages = report.messages,
                    coordinated_attacks = report.coordinated_attacks,
                    "telemetry"
                );
            }
        }
        received
    });

    let mut runner = SimulationRunner::new(config)
        .context("building simulation")?
        .with_telemetry(tx);
    let metrics = runner.run();
    // Dropping the runner closes the channel and ends the telemetry thread
    drop(runner);

    match telemetry.join() {
        Ok(received) => tracing::debug!(received, "telemetry drained"),
        Err(_) => tracing::warn!("telemetry thread panicked"),
    }

    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
