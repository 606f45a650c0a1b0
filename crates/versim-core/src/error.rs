//! Error types for signing and comparison

use thiserror::Error;

/// Errors raised by the core pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    /// The two sides of a comparison were sampled at different rates
    #[error("sample rates differ: {left} Hz vs {right} Hz")]
    RateMismatch { left: u32, right: u32 },

    /// A window's histogram had zero total weight and could not be normalized
    #[error("window {window} has no spectral weight in any note bin")]
    DegenerateHistogram { window: usize },

    /// One of the fingerprints has no windows
    #[error("cannot compare empty fingerprint")]
    EmptyAlignment,

    /// Nyquist frequency does not clear the top piano note
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
