//! # Signal Builder Module
//!
//! Turns raw integer sequences into fixed-size occupancy signals that the
//! spectral analyzer can transform.
//!
//! A sequence is min-max scaled into `[0, 1]` over the whole trial, then each
//! sample marks the bucket it lands in. Buckets are binary: several samples
//! in the same bucket still count as a single hit.

use rustfft::FftNum;
use rustfft::num_traits::Float;
use tracing::warn;

use crate::error::{Result, SpectraError};
use crate::math::clamp;

/// A min-max normalized sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Samples scaled into `[0, 1]`.
    pub samples: Vec<f64>,
    /// Set when every input value was identical. The samples are then all
    /// `0.0` instead of the undefined `0 / 0`.
    pub degenerate: bool,
}

/// Scales `values` into `[0, 1]` using the sequence's own minimum and maximum.
///
/// # Errors
/// * [`SpectraError::EmptySequence`] if `values` is empty
pub fn normalize_sequence(values: &[i64]) -> Result<Normalized> {
    let (&first, rest) = values.split_first().ok_or(SpectraError::EmptySequence)?;
    let (min, max) = rest
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if min == max {
        warn!(value = min, len = values.len(), "constant sequence, normalizing to zero");
        return Ok(Normalized {
            samples: vec![0.0; values.len()],
            degenerate: true,
        });
    }

    // i128 keeps the span exact for the full i64 range
    let span = (i128::from(max) - i128::from(min)) as f64;
    let samples = values
        .iter()
        .map(|&v| (i128::from(v) - i128::from(min)) as f64 / span)
        .collect();

    Ok(Normalized {
        samples,
        degenerate: false,
    })
}

/// Maps a normalized sample to its bucket, `clamp(floor(s * B), 0, B - 1)`.
pub fn bucket_index(sample: f64, bucket_count: usize) -> usize {
    let scaled = (sample * bucket_count as f64).floor();
    clamp(scaled, 0.0, bucket_count.saturating_sub(1) as f64) as usize
}

/// Builds a binary occupancy signal of `bucket_count` buckets from
/// normalized samples.
///
/// The result does not depend on sample order.
///
/// # Errors
/// * [`SpectraError::EmptySignal`] if `bucket_count` is zero
pub fn build_occupancy_signal<T>(samples: &[f64], bucket_count: usize) -> Result<Vec<T>>
where
    T: FftNum + Float,
{
    if bucket_count == 0 {
        return Err(SpectraError::EmptySignal);
    }

    let mut signal = vec![T::zero(); bucket_count];
    for &sample in samples {
        signal[bucket_index(sample, bucket_count)] = T::one();
    }
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_scenario() {
        let signal: Vec<f64> = build_occupancy_signal(&[0.0, 0.5, 0.999], 4).unwrap();
        assert_eq!(signal, vec![1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_one_lands_in_last_bucket() {
        assert_eq!(bucket_index(1.0, 8), 7);
        assert_eq!(bucket_index(0.0, 8), 0);
        assert_eq!(bucket_index(-0.25, 8), 0);
        let signal: Vec<f32> = build_occupancy_signal(&[1.0], 8).unwrap();
        assert_eq!(signal[7], 1.0);
        assert_eq!(signal.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_repeated_hits_collapse() {
        let signal: Vec<f64> = build_occupancy_signal(&[0.1, 0.1, 0.11, 0.1], 4).unwrap();
        assert_eq!(signal, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_order_does_not_matter() {
        let samples = [0.93, 0.02, 0.5, 0.51, 0.77, 0.02, 0.31];
        let mut reversed = samples;
        reversed.reverse();
        let mut shuffled = samples;
        shuffled.swap(0, 4);
        shuffled.swap(2, 6);

        let a: Vec<f64> = build_occupancy_signal(&samples, 16).unwrap();
        let b: Vec<f64> = build_occupancy_signal(&reversed, 16).unwrap();
        let c: Vec<f64> = build_occupancy_signal(&shuffled, 16).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let result = build_occupancy_signal::<f64>(&[0.5], 0);
        assert!(matches!(result, Err(SpectraError::EmptySignal)));
    }

    #[test]
    fn test_normalize_min_max() {
        let normalized = normalize_sequence(&[5, 10, 15, 7]).unwrap();
        assert!(!normalized.degenerate);
        assert_eq!(normalized.samples, vec![0.0, 0.5, 1.0, 0.2]);
    }

    #[test]
    fn test_normalize_constant_sequence() {
        let normalized = normalize_sequence(&[3, 3, 3]).unwrap();
        assert!(normalized.degenerate);
        assert_eq!(normalized.samples, vec![0.0; 3]);
    }

    #[test]
    fn test_normalize_full_i64_range() {
        let normalized = normalize_sequence(&[i64::MIN, 0, i64::MAX]).unwrap();
        assert_eq!(normalized.samples[0], 0.0);
        assert_eq!(normalized.samples[2], 1.0);
        assert!((normalized.samples[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(matches!(normalize_sequence(&[]), Err(SpectraError::EmptySequence)));
    }
}
