// spectra-core/src/lib.rs

//! The core logic for sequence spectrum analysis.
//! This crate turns integer sequences into occupancy signals, averages their
//! magnitude spectra over many trials and renders the results to PNG.
//! It is completely headless and contains no command line code.

pub mod canvas;
pub mod config;
pub mod error;
pub mod fft;
pub mod graph;
pub mod math;
pub mod pipeline;
pub mod rng;
pub mod sequences;
pub mod signal;
pub mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use canvas::{Canvas, Rgba};
pub use config::{BatteryConfig, PipelineConfig, Precision, SpectrumTest};
pub use error::{Result, SpectraError};
pub use sequences::{SequenceKind, SequenceSource};

/// Represents the result of one named test after its final trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Test name, also the stem of every artifact file.
    pub name: String,
    /// Number of trials averaged.
    pub trials: usize,
    /// Samples per generated sequence.
    pub sequence_length: usize,
    /// Spectrum length.
    pub bucket_count: usize,
    /// Trials whose sequence was constant and normalized to zero.
    pub degenerate_trials: usize,
    /// Mean magnitude per bucket, zero frequency in the middle.
    pub mean: Vec<f64>,
    /// Standard deviation per bucket.
    pub std_dev: Vec<f64>,
    /// Files written for this test.
    pub artifacts: Vec<PathBuf>,
}

impl TestReport {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
