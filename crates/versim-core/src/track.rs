//! Loaded tracks and silence trimming
//!
//! Two renditions of a piece rarely start at the same instant. Cutting the
//! quiet lead-in and the zero padding at the end lines them up on their
//! first audible onset so they can be compared window for window.

use serde::{Deserialize, Serialize};

/// Mono PCM samples together with their sample rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Samples on a 16-bit integer scale
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Track {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy of this track with silence trimmed, at the same sample rate
    pub fn trimmed(&self, threshold: f32) -> Track {
        Track {
            samples: trim(&self.samples, threshold).to_vec(),
            sample_rate: self.sample_rate,
        }
    }
}

/// Trim leading quiet samples and trailing zeros
///
/// The result starts at the first sample strictly above `threshold` and ends
/// with the last nonzero sample. When no sample exceeds the threshold the
/// start stays at 0; when every sample is zero nothing is cut from the end.
pub fn trim(samples: &[f32], threshold: f32) -> &[f32] {
    let start = samples
        .iter()
        .position(|&s| s > threshold)
        .unwrap_or(0);

    let end = samples
        .iter()
        .rposition(|&s| s != 0.0)
        .map(|last| last + 1)
        .unwrap_or(samples.len());

    // start <= end: a sample above a non-negative threshold is itself nonzero
    &samples[start.min(end)..end]
}
