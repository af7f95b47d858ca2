//! Rtuscope - serial Modbus RTU register monitor.
//!
//! Polls a block of holding registers from a single RTU slave at a fixed
//! interval and prints each reading (or failure) as a timestamped line.
//! The poll loop runs on its own task; this binary is just a consumer of
//! its notification channel.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use rtuscope::history::ReadingLog;
use rtuscope::series::ChartSeries;
use rtuscope_common::{LoggingConfig, MonitorConfig, PollEvent, init_tracing};
use rtuscope_poller::PollWorker;

/// Serial Modbus RTU register monitor.
#[derive(Parser, Debug)]
#[command(name = "rtuscope")]
#[command(about = "Polls Modbus RTU holding registers and logs readings")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format)
    #[arg(short, long, default_value = "rtuscope.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        MonitorConfig::load_from_file(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        MonitorConfig::default()
    };

    let log_config = LoggingConfig {
        level: args
            .log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone()),
        format: config.logging.format,
    };
    init_tracing(&log_config)?;

    info!("Starting rtuscope");
    if args.config.exists() {
        info!(path = ?args.config, "Loaded configuration");
    } else {
        info!(path = ?args.config, "Config file not found, using defaults");
    }
    info!(
        port = %config.device.port,
        slave = config.device.slave_id,
        start = config.device.start_address,
        quantity = config.device.quantity,
        interval_ms = config.device.poll_interval_ms,
        "Polling target"
    );

    let mut log = ReadingLog::new();
    let mut series = ChartSeries::new(config.device.quantity as usize);

    let mut worker = PollWorker::new(config.device.clone());
    let Some(mut events) = worker.start() else {
        anyhow::bail!("poll worker already running");
    };

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let PollEvent::DataReceived(text) = &event {
                        series.append_line(text);
                    }
                    println!("{}", log.push(&event).render());
                }
                None => {
                    // worker exited on its own (fatal connect failure)
                    warn!("Poll worker exited");
                    break;
                }
            },
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    worker.stop().await;

    // drain whatever the final cycle emitted before the channel closed
    while let Ok(event) = events.try_recv() {
        if let PollEvent::DataReceived(text) = &event {
            series.append_line(text);
        }
        println!("{}", log.push(&event).render());
    }

    info!(
        readings = log.reading_count(),
        errors = log.error_count(),
        charted = series.len(),
        "Session summary"
    );

    Ok(())
}
