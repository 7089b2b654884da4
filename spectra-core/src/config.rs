//! Pipeline and battery configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. The defaults reproduce the standard battery: random Fibonacci,
//! uniform white noise, primes and a coin toss walk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::GraphStyle;
use crate::sequences::SequenceKind;

/// Floating point width used for occupancy signals and the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    Single,
    #[default]
    Double,
}

/// Settings shared by every test in a battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Occupancy signal length, and therefore spectrum length.
    pub bucket_count: usize,
    pub image_width: usize,
    pub image_height: usize,
    /// Height of the number line strip appended below the averaged graph.
    /// Zero disables it.
    pub number_line_height: usize,
    pub precision: Precision,
    /// Threads computing trial spectra. One runs everything inline.
    pub workers: usize,
    /// Draw the standard deviation envelope on the averaged graph.
    pub show_std_dev: bool,
    pub output_dir: PathBuf,
    pub style: GraphStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket_count: 1024,
            image_width: 1024,
            image_height: 256,
            number_line_height: 64,
            precision: Precision::Double,
            workers: 1,
            show_std_dev: true,
            output_dir: PathBuf::from("out"),
            style: GraphStyle::default(),
        }
    }
}

/// One named experiment: which sequence, how long, how many trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumTest {
    pub name: String,
    pub sequence: SequenceKind,
    pub trials: usize,
    pub sequence_length: usize,
}

impl SpectrumTest {
    pub fn new(sequence: SequenceKind, trials: usize, sequence_length: usize) -> Self {
        Self {
            name: sequence.name().to_string(),
            sequence,
            trials,
            sequence_length,
        }
    }
}

/// A pipeline configuration plus the tests to run with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub pipeline: PipelineConfig,
    pub tests: Vec<SpectrumTest>,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            tests: vec![
                SpectrumTest::new(SequenceKind::RandomFibonacci, 1000, 100),
                SpectrumTest::new(SequenceKind::UniformWhite, 1000, 100),
                SpectrumTest::new(SequenceKind::Primes, 1, 200),
                SpectrumTest::new(SequenceKind::CoinToss, 1000, 100),
            ],
        }
    }
}

impl BatteryConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
