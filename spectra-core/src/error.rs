//! Error type shared by every stage of the spectrum pipeline.

use thiserror::Error;

/// Errors produced by the canvas, the signal/spectrum stages and the
/// pipeline driver.
#[derive(Debug, Error)]
pub enum SpectraError {
    /// A sequence generator returned no samples.
    #[error("sequence is empty")]
    EmptySequence,

    /// A signal or bucket count of zero was handed to the analyzer.
    #[error("signal must contain at least one bucket")]
    EmptySignal,

    /// The analyzer was planned for a different signal length.
    #[error("signal has {actual} buckets but the analyzer was planned for {expected}")]
    SignalLengthMismatch { expected: usize, actual: usize },

    /// A spectrum fed to the accumulator changed length between trials.
    #[error("spectrum has {actual} buckets but the accumulator holds {expected}")]
    SpectrumLengthMismatch { expected: usize, actual: usize },

    /// Trials must reach the accumulator in order.
    #[error("trial {got} arrived out of order, expected trial {expected}")]
    TrialOutOfOrder { expected: usize, got: usize },

    /// A test was configured with no trials.
    #[error("test `{0}` has zero trials")]
    ZeroTrials(String),

    /// Canvas concatenation without permission to pad.
    #[error("{axis} mismatch: {this} vs {other}")]
    DimensionMismatch {
        axis: &'static str,
        this: usize,
        other: usize,
    },

    /// A zero-sized canvas cannot be encoded.
    #[error("cannot export an empty {width}x{height} canvas")]
    EmptyCanvas { width: usize, height: usize },

    /// A trial worker hung up before delivering every spectrum.
    #[error("trial worker disconnected after {received} of {expected} spectra")]
    WorkerDisconnected { expected: usize, received: usize },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpectraError>;
