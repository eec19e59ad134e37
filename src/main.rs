// src/main.rs

//! # dirwatch Main Entry Point
//!
//! Loads configuration, initializes logging, prepares the watched directory,
//! and launches the receiver and handler tasks. There is no shutdown path:
//! the process runs until it is killed.

use anyhow::Result;
use dirwatch::config::AppConfig;
use dirwatch::error::WatchError;
use dirwatch::relay;
use dirwatch::watcher::{self, DirWatcher};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Logs a setup failure and terminates the process.
fn fatal(err: WatchError) -> ! {
    tracing::error!("{}", err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing subscriber for logging with environment filter and max level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&app_config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(std::io::stderr) // Event lines own stdout
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("dirwatch starting with configuration: {:?}", app_config);

    let dir = app_config.watch_dir.as_path();
    if let Err(e) = watcher::ensure_dir(dir).await {
        fatal(e);
    }

    let (mut dir_watcher, streams) = match DirWatcher::new() {
        Ok(pair) => pair,
        Err(e) => fatal(e),
    };

    let (hand_off_tx, hand_off_rx) = relay::hand_off();
    let receiver = tokio::spawn(relay::run_receiver(streams, hand_off_tx));
    let handler = tokio::spawn(relay::run_handler(hand_off_rx, std::io::stdout()));

    if let Err(e) = dir_watcher.add(dir) {
        fatal(e);
    }

    // Neither task finishes while `dir_watcher` is alive.
    let (receiver_result, handler_result) = tokio::join!(receiver, handler);
    if let Err(e) = receiver_result {
        tracing::error!("Receiver task panicked: {}", e);
    }
    handler_result??;

    dir_watcher.close();
    Ok(())
}
