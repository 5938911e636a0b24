// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod capture;
mod config;
mod error;
mod logging;
mod view;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use dtmf_core::{DynResult, Pipeline};

use config::{AppConfig, ConfigFile};
use view::ConsoleView;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - real-time DTMF decoder");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Capture device name (overrides config)
    #[arg(long = "device", short = 'd')]
    device: Option<String>,
    /// Capture sample rate in Hz (overrides config)
    #[arg(long = "sample-rate")]
    sample_rate: Option<u32>,
    /// Detection threshold (overrides config)
    #[arg(long = "threshold")]
    threshold: Option<f32>,
    /// Log level, e.g. "info", "debug" (overrides config)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

fn main() -> DynResult<()> {
    let cli = Cli::parse();

    let (mut app_config, config_path) = if let Some(ref path) = cli.config {
        (AppConfig::load_from_file(path)?, Some(path.clone()))
    } else {
        AppConfig::load_from_default_paths()?
    };

    if let Some(device) = cli.device.clone() {
        app_config.capture.device = Some(device);
    }
    if let Some(sample_rate) = cli.sample_rate {
        app_config.capture.sample_rate = sample_rate;
    }
    if let Some(threshold) = cli.threshold {
        app_config.pipeline.detection_threshold = threshold;
    }
    if let Some(log_level) = cli.log_level.clone() {
        app_config.capture.log_level = Some(log_level);
    }

    logging::init_logging(app_config.capture.log_level.as_deref());

    if let Some(path) = &config_path {
        info!("Loaded configuration from {}", path.display());
    } else {
        info!("No configuration file found, using defaults");
    }

    app_config
        .pipeline
        .validate()
        .map_err(|e| format!("invalid pipeline configuration: {e}"))?;

    let mut pipeline = Pipeline::init(app_config.capture.sample_rate, app_config.pipeline)?;
    pipeline.set_sink(Arc::new(ConsoleView));
    let pipeline = Arc::new(pipeline);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc_handler(move || running.store(false, Ordering::Release))?;
    }

    let cycle_interval = Duration::from_millis(app_config.pipeline.window_ms as u64);

    info!(
        sample_rate = app_config.capture.sample_rate,
        device = ?app_config.capture.device,
        "Starting DTMF decoder"
    );

    capture::run_capture(
        pipeline.clone(),
        app_config.capture.device.clone(),
        cycle_interval,
        app_config.pipeline.monitor_interval_seconds,
        running,
    );

    info!("DTMF decoder shutting down");

    // `pipeline` is the sole remaining owner once capture returns; unwrap
    // it to run `Drop`'s shutdown synchronously before exit.
    match Arc::try_unwrap(pipeline) {
        Ok(mut pipeline) => pipeline.shutdown(),
        Err(shared) => {
            // Another clone is still alive (e.g. a panicking capture
            // thread); shutdown still runs via Drop when it's released.
            drop(shared);
        }
    }

    Ok(())
}

/// Install a Ctrl-C handler without pulling in a signal-handling crate the
/// rest of the stack doesn't already use: SIGINT/SIGTERM delivery semantics
/// aren't load-bearing here, only "stop looping soon" is.
fn ctrlc_handler(on_signal: impl Fn() + Send + Sync + 'static) -> DynResult<()> {
    #[cfg(unix)]
    {
        use std::sync::OnceLock;

        static HANDLER: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();
        extern "C" fn handle(_: libc::c_int) {
            if let Some(handler) = HANDLER.get() {
                handler();
            }
        }

        HANDLER
            .set(Box::new(on_signal))
            .map_err(|_| "ctrlc_handler installed twice")?;

        unsafe {
            libc::signal(libc::SIGINT, handle as usize);
            libc::signal(libc::SIGTERM, handle as usize);
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = on_signal;
        Ok(())
    }
}
