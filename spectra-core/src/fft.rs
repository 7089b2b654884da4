//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns occupancy signals into magnitude spectra ready for
//! averaging and plotting.
//!
//! ## Features
//! - Forward transforms planned once per bucket count using RustFFT
//! - Single or double precision, chosen by the caller's sample type
//! - DC removal, since the zero-frequency term dwarfs every other bucket
//! - Recentered output with zero frequency in the middle of the spectrum

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::num_traits::Float;
use rustfft::{Fft, FftNum, FftPlanner};

use crate::error::{Result, SpectraError};

/// A forward FFT planned for a fixed signal length.
///
/// The planned transform is immutable and `Send + Sync`, so one analyzer can
/// be shared by every trial worker.
#[derive(Clone)]
pub struct SpectrumAnalyzer<T: FftNum> {
    fft: Arc<dyn Fft<T>>,
    len: usize,
}

impl<T: FftNum> fmt::Debug for SpectrumAnalyzer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer").field("len", &self.len).finish()
    }
}

impl<T> SpectrumAnalyzer<T>
where
    T: FftNum + Float,
{
    /// Plans a forward transform for signals of `bucket_count` samples.
    ///
    /// # Errors
    /// * [`SpectraError::EmptySignal`] if `bucket_count` is zero
    pub fn new(bucket_count: usize) -> Result<Self> {
        if bucket_count == 0 {
            return Err(SpectraError::EmptySignal);
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(bucket_count);
        Ok(Self {
            fft,
            len: bucket_count,
        })
    }

    /// Number of buckets this analyzer accepts and produces.
    pub fn bucket_count(&self) -> usize {
        self.len
    }

    /// Computes the recentered magnitude spectrum of a real-valued signal.
    ///
    /// The signal is processed through the following steps:
    /// 1. Promotion to complex samples with zero imaginary parts
    /// 2. Forward FFT
    /// 3. Zeroing of the DC bucket
    /// 4. Recentering so output `i` holds bucket `(i + B/2) mod B`
    /// 5. Magnitude extraction
    ///
    /// # Arguments
    /// * `signal` - Occupancy signal, exactly `self.bucket_count()` samples
    ///
    /// # Returns
    /// * `Vec<f64>` - Magnitude per frequency bucket, most negative frequency first
    pub fn magnitude_spectrum(&self, signal: &[T]) -> Result<Vec<f64>> {
        if signal.is_empty() {
            return Err(SpectraError::EmptySignal);
        }
        if signal.len() != self.len {
            return Err(SpectraError::SignalLengthMismatch {
                expected: self.len,
                actual: signal.len(),
            });
        }

        let mut buffer: Vec<Complex<T>> = signal
            .iter()
            .map(|&sample| Complex::new(sample, T::zero()))
            .collect();
        self.fft.process(&mut buffer);

        remove_dc(&mut buffer);
        Ok(recentered_magnitudes(&buffer))
    }
}

/// Plans a transform for `signal.len()` and computes its magnitude spectrum.
///
/// Convenient for one-off spectra; batch work should keep a
/// [`SpectrumAnalyzer`] around instead of re-planning every call.
pub fn compute_magnitude_spectrum<T>(signal: &[T]) -> Result<Vec<f64>>
where
    T: FftNum + Float,
{
    SpectrumAnalyzer::new(signal.len())?.magnitude_spectrum(signal)
}

/// Zeroes the zero-frequency term of a transformed buffer.
///
/// The DC bucket carries the signal's average, which for occupancy signals is
/// just the hit count and would flatten the rest of the plot.
fn remove_dc<T: FftNum>(spectrum: &mut [Complex<T>]) {
    if let Some(dc) = spectrum.first_mut() {
        *dc = Complex::new(T::zero(), T::zero());
    }
}

/// Extracts magnitudes with zero frequency moved to the middle.
fn recentered_magnitudes<T>(spectrum: &[Complex<T>]) -> Vec<f64>
where
    T: FftNum + Float,
{
    let len = spectrum.len();
    (0..len)
        .map(|i| {
            let c = spectrum[(i + len / 2) % len];
            c.norm().to_f64().unwrap_or_default() // .norm() is sqrt(re^2 + im^2)
        })
        .collect()
}

/// Returns the largest magnitude in `spectrum`, or `0.0` when it is empty.
pub fn max_magnitude(spectrum: &[f64]) -> f64 {
    spectrum.iter().fold(0.0f64, |max, &val| val.max(max))
}
