//! Dominant frequency extraction
//!
//! Runs an FFT over a window of samples and keeps the strongest components
//! of the positive-frequency half.

use rustfft::{num_complex::Complex, FftPlanner};

/// The strongest spectral components of one window
///
/// Both vectors have the same length and are ordered by descending amplitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopKFrequencies {
    /// Bin frequencies in Hz
    pub frequencies: Vec<f32>,
    /// Magnitudes scaled by 2/N
    pub amplitudes: Vec<f32>,
}

impl TopKFrequencies {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }
}

/// FFT-based top-k extractor
///
/// Holds an `FftPlanner` so the plans for the full and the shorter final
/// window are reused across every window of a track.
pub struct SpectralExtractor {
    planner: FftPlanner<f32>,
    top_k: usize,
}

impl SpectralExtractor {
    pub fn new(top_k: usize) -> Self {
        Self {
            planner: FftPlanner::new(),
            top_k,
        }
    }

    /// Extract the `top_k` largest components among the first N/2 bins
    ///
    /// Windows shorter than `2 * top_k` yield fewer than `top_k` components.
    /// Ties between equal magnitudes are broken arbitrarily.
    pub fn extract(&mut self, window: &[f32], sample_rate: u32) -> TopKFrequencies {
        let n = window.len();
        let half = n / 2;
        if half == 0 {
            return TopKFrequencies::default();
        }

        let magnitudes = self.magnitudes(window);
        let mut order: Vec<usize> = (0..half).collect();
        let k = self.top_k.min(half);

        let by_magnitude_desc =
            |a: &usize, b: &usize| magnitudes[*b].total_cmp(&magnitudes[*a]);
        if k < half {
            order.select_nth_unstable_by(k - 1, by_magnitude_desc);
            order.truncate(k);
        }
        order.sort_unstable_by(by_magnitude_desc);

        let bin_width = sample_rate as f32 / n as f32;
        TopKFrequencies {
            frequencies: order.iter().map(|&i| i as f32 * bin_width).collect(),
            amplitudes: order.iter().map(|&i| magnitudes[i]).collect(),
        }
    }

    /// Scaled magnitudes of the positive-frequency half
    fn magnitudes(&mut self, window: &[f32]) -> Vec<f32> {
        let n = window.len();
        let fft = self.planner.plan_fft_forward(n);

        let mut buffer: Vec<Complex<f32>> =
            window.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buffer);

        let scale = 2.0 / n as f32;
        buffer[..n / 2].iter().map(|c| c.norm() * scale).collect()
    }
}
