//! Note bin generation
//!
//! Splits the spectrum into one interval per piano key (A0 to C8). Bin
//! edges sit half a semitone either side of each equal-tempered pitch, with
//! a catch-all bin below A0 and another from above C8 up to nyquist.

use crate::error::{Result, SimilarityError};

/// Reference pitch A4
pub const A4_FREQUENCY_HZ: f32 = 440.0;

/// Keys on a modern piano
pub const PIANO_KEYS: usize = 88;

/// Index of A4 counting from A0 = 0
pub const A4_KEY_INDEX: usize = 48;

pub const SEMITONES_PER_OCTAVE: f32 = 12.0;

/// Strictly increasing frequency boundaries in Hz
#[derive(Debug, Clone, PartialEq)]
pub struct NoteBins {
    edges: Vec<f32>,
}

impl NoteBins {
    /// Build the 91 edges for `sample_rate`
    ///
    /// Only the last edge (nyquist) depends on the rate. Rates whose nyquist
    /// does not clear the top piano edge are rejected.
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self> {
        let mut edges = Vec::with_capacity(PIANO_KEYS + 3);
        edges.push(0.0);
        edges.extend((0..=PIANO_KEYS).map(piano_edge));

        let nyquist = sample_rate as f32 / 2.0;
        let top = edges[edges.len() - 1];
        if nyquist <= top {
            return Err(SimilarityError::UnsupportedSampleRate(sample_rate));
        }
        edges.push(nyquist);

        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    /// Number of bins, one less than the number of edges
    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin containing `freq`
    ///
    /// Bins are half-open `[lo, hi)` except the last, which also holds its
    /// upper edge. Frequencies outside `[0, nyquist]` map to `None`.
    pub fn bin_index(&self, freq: f32) -> Option<usize> {
        let upper = self.edges.partition_point(|&edge| edge <= freq);
        if upper == 0 {
            return None;
        }
        if upper == self.edges.len() {
            let last = self.edges[upper - 1];
            return (freq == last).then(|| self.num_bins() - 1);
        }
        Some(upper - 1)
    }
}

/// Lower edge of piano key `key`, half a semitone below its pitch
fn piano_edge(key: usize) -> f32 {
    let semitones = key as f32 - A4_KEY_INDEX as f32 - 0.5;
    A4_FREQUENCY_HZ * 2.0_f32.powf(semitones / SEMITONES_PER_OCTAVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_count_and_bounds() {
        let bins = NoteBins::for_sample_rate(44100).unwrap();
        assert_eq!(bins.edges().len(), 91);
        assert_eq!(bins.num_bins(), 90);
        assert_eq!(bins.edges()[0], 0.0);
        assert_eq!(bins.edges()[90], 22050.0);
    }

    #[test]
    fn test_strictly_increasing() {
        for rate in [11025, 16000, 22050, 44100, 48000, 96000] {
            let bins = NoteBins::for_sample_rate(rate).unwrap();
            assert!(bins.edges().windows(2).all(|w| w[0] < w[1]), "rate {}", rate);
        }
    }

    #[test]
    fn test_edges_bracket_a4() {
        let bins = NoteBins::for_sample_rate(44100).unwrap();
        // A0 is key 0, so A4 lives in bin 49 (bin 0 is the sub-A0 range)
        let a4 = bins.bin_index(440.0).unwrap();
        assert_eq!(a4, A4_KEY_INDEX + 1);
        let lo = bins.edges()[a4];
        let hi = bins.edges()[a4 + 1];
        assert!(lo < 440.0 && 440.0 < hi);
        assert!((hi / lo - 2.0_f32.powf(1.0 / 12.0)).abs() < 1e-4);
    }

    #[test]
    fn test_bin_index_limits() {
        let bins = NoteBins::for_sample_rate(16000).unwrap();
        assert_eq!(bins.bin_index(0.0), Some(0));
        assert_eq!(bins.bin_index(8000.0), Some(89));
        assert_eq!(bins.bin_index(8000.5), None);
        assert_eq!(bins.bin_index(-1.0), None);
    }

    #[test]
    fn test_rejects_low_rates() {
        assert_eq!(
            NoteBins::for_sample_rate(8000),
            Err(SimilarityError::UnsupportedSampleRate(8000))
        );
        assert!(NoteBins::for_sample_rate(0).is_err());
    }
}
