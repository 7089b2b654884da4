//! # Spectra - Sequence Spectrum Battery
//!
//! Command line front end for `spectra-core`. It runs a battery of named
//! tests, each averaging the magnitude spectra of many generated sequences,
//! and writes one set of PNG graphs and a JSON report per test.
//!
//! ## Usage
//! - `spectra` runs the built-in battery into `out/`
//! - `spectra --config battery.json` runs a custom battery
//! - `spectra --dump-config battery.json` writes the built-in battery as a
//!   starting point for editing
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use spectra_core::BatteryConfig;
use spectra_core::pipeline::run_battery;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Averages DFT magnitude spectra of integer sequences and plots them.
#[derive(Debug, Parser)]
#[command(name = "spectra", version, about)]
struct Cli {
    /// JSON battery configuration. The built-in battery is used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for graphs and reports, overriding the configuration.
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Threads computing trial spectra, overriding the configuration.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Write the effective configuration to FILE and exit without running.
    #[arg(long, value_name = "FILE")]
    dump_config: Option<PathBuf>,
}

/// Installs the global log subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Builds the battery from the config file (if any) and command line overrides.
fn load_battery(cli: &Cli) -> Result<BatteryConfig> {
    let mut battery = match &cli.config {
        Some(path) => BatteryConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BatteryConfig::default(),
    };

    if let Some(out) = &cli.out {
        battery.pipeline.output_dir = out.clone();
    }
    if let Some(workers) = cli.workers {
        battery.pipeline.workers = workers;
    }
    Ok(battery)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let battery = load_battery(&cli)?;

    if let Some(path) = &cli.dump_config {
        battery
            .save_to_file(path)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        info!(path = %path.display(), "wrote configuration");
        return Ok(());
    }

    info!(
        tests = battery.tests.len(),
        buckets = battery.pipeline.bucket_count,
        workers = battery.pipeline.workers,
        out = %battery.pipeline.output_dir.display(),
        "starting battery"
    );

    let results = run_battery(&battery);
    let mut failures = 0;
    for (test, result) in battery.tests.iter().zip(&results) {
        match result {
            Ok(report) => info!(
                test = %report.name,
                trials = report.trials,
                files = report.artifacts.len(),
                "done"
            ),
            Err(_) => {
                warn!(test = %test.name, "no output written");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} tests failed", results.len());
    }
    info!("battery finished");
    Ok(())
}
