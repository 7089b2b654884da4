//! # Running Statistics Module
//!
//! Averages magnitude spectra across trials without keeping every spectrum
//! around. Each bucket tracks a running mean and a running mean of squares,
//! from which the standard deviation can be read at any checkpoint.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectraError};
use crate::math::lerp;

/// Per-bucket running mean and mean-of-squares over a series of trials.
///
/// The accumulator sizes itself on the first spectrum it sees; until then
/// every query returns `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningSpectrum {
    mean: Vec<f64>,
    mean_sq: Vec<f64>,
    trials: usize,
}

impl RunningSpectrum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds trial `trial_index` into the running statistics.
    ///
    /// Each bucket moves toward the new value with weight `1 / (trial_index + 1)`,
    /// which reproduces the cumulative arithmetic mean as long as trials
    /// arrive in order.
    ///
    /// # Errors
    /// * [`SpectraError::TrialOutOfOrder`] if `trial_index` is not the next trial
    /// * [`SpectraError::SpectrumLengthMismatch`] if the bucket count changed
    /// * [`SpectraError::EmptySignal`] if `spectrum` is empty
    pub fn update(&mut self, trial_index: usize, spectrum: &[f64]) -> Result<()> {
        if trial_index != self.trials {
            return Err(SpectraError::TrialOutOfOrder {
                expected: self.trials,
                got: trial_index,
            });
        }
        if spectrum.is_empty() {
            return Err(SpectraError::EmptySignal);
        }
        if self.trials == 0 {
            self.mean = vec![0.0; spectrum.len()];
            self.mean_sq = vec![0.0; spectrum.len()];
        } else if spectrum.len() != self.mean.len() {
            return Err(SpectraError::SpectrumLengthMismatch {
                expected: self.mean.len(),
                actual: spectrum.len(),
            });
        }

        let weight = 1.0 / (trial_index as f64 + 1.0);
        for ((mean, mean_sq), &value) in self
            .mean
            .iter_mut()
            .zip(self.mean_sq.iter_mut())
            .zip(spectrum)
        {
            *mean = lerp(*mean, value, weight);
            *mean_sq = lerp(*mean_sq, value * value, weight);
        }

        self.trials += 1;
        Ok(())
    }

    /// Number of trials folded in so far.
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials == 0
    }

    pub fn mean(&self) -> Option<&[f64]> {
        (!self.is_empty()).then_some(self.mean.as_slice())
    }

    pub fn mean_of_squares(&self) -> Option<&[f64]> {
        (!self.is_empty()).then_some(self.mean_sq.as_slice())
    }

    /// Standard deviation per bucket, `sqrt(|E[x²] - E[x]²|)`.
    ///
    /// The absolute value absorbs round-off that would otherwise leave a
    /// tiny negative variance.
    pub fn std_dev(&self) -> Option<Vec<f64>> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.mean
                .iter()
                .zip(&self.mean_sq)
                .map(|(&mean, &mean_sq)| (mean_sq - mean * mean).abs().sqrt())
                .collect(),
        )
    }
}
