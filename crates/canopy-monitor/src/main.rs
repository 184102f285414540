//! CLI binary entry point for the canopy hierarchy monitor.
//!
//! Usage:
//!   canopy-monitor [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>     Path to configuration TOML file
//!   -i, --interval <SECS>   Polling interval in seconds (overrides config)
//!   -b, --bootstrap <ADDR>  Bootstrap address host:port (repeatable)
//!   -t, --topology <FILE>   JSON leader-description file to poll
//!   -v, --verbose           Increase logging verbosity

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use canopy_monitor::config::MonitorConfig;
use canopy_monitor::poller::{PollerConfig, PollingController, STATUS_STOPPED};
use canopy_topology::{FileSource, TopologySource};

/// Canopy - polls a cluster's management hierarchy and renders it as a tree.
#[derive(Parser, Debug)]
#[command(name = "canopy-monitor")]
#[command(about = "Cluster hierarchy monitor with radial tree layout")]
#[command(version)]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Polling interval in seconds.
    #[arg(short, long, value_name = "SECS")]
    interval: Option<u64>,

    /// Bootstrap address (host:port, can be specified multiple times).
    #[arg(short, long, value_name = "ADDR")]
    bootstrap: Vec<String>,

    /// JSON leader-description file for the file-backed topology source.
    #[arg(short, long, value_name = "FILE")]
    topology: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration.
    let mut config = MonitorConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides.
    if let Some(interval) = cli.interval {
        config.poll.interval_secs = interval;
    }
    if !cli.bootstrap.is_empty() {
        config.cluster.bootstrap = cli.bootstrap;
    }
    if let Some(topology) = cli.topology {
        config.cluster.topology_file = Some(topology);
    }

    // Adjust log level based on verbosity.
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    // Initialize logging.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let bootstrap = config.bootstrap_addresses()?;
    if bootstrap.is_empty() {
        tracing::warn!("No bootstrap addresses configured");
    }

    let source: Arc<dyn TopologySource> = match &config.cluster.topology_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file-backed topology source");
            Arc::new(FileSource::new(path))
        }
        None => anyhow::bail!(
            "No topology source configured: set cluster.topology_file (or --topology) \
             to a JSON leader-description file"
        ),
    };

    let controller = PollingController::new(
        source,
        PollerConfig {
            bootstrap,
            canvas_size: config.layout.canvas_size,
            query_timeout: config.query_timeout(),
        },
    );

    // Subscribe before starting so no status transition is missed.
    let mut snapshots = controller.snapshots();
    let mut status = controller.status();

    controller.start(config.poll.interval_secs)?;
    tracing::info!(
        interval_secs = config.poll.interval_secs,
        "Canopy monitor is running"
    );

    // Ctrl-C requests a stop; the loop finishes its current iteration and
    // reports "Stopped" before we exit.
    let stopper = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            stopper.stop();
        }
    });

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    println!("{}", snapshot.to_text());
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = status.borrow_and_update().clone();
                tracing::info!(status = %line, "Status changed");
                if line == STATUS_STOPPED {
                    break;
                }
            }
        }
    }

    Ok(())
}
