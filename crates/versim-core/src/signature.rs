//! Window signatures and track signing
//!
//! A signature is the distribution of dominant notes in one analysis
//! window: the top-k spectral components are binned into piano keys,
//! weighted by amplitude, and normalized to sum to one. Signing a track
//! slides half-overlapping windows of just over one second across it.

use crate::config::{DegeneratePolicy, SimilarityConfig};
use crate::error::{Result, SimilarityError};
use crate::notes::NoteBins;
use crate::spectrum::{SpectralExtractor, TopKFrequencies};
use crate::track::Track;
use serde::{Deserialize, Serialize};

/// Distribution of dominant notes for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    weights: Vec<f32>,
}

impl Signature {
    /// Bin the components into `bins` and normalize
    ///
    /// Returns `None` when the histogram total is zero (silent window, or no
    /// components at all).
    pub fn from_top_k(top_k: &TopKFrequencies, bins: &NoteBins) -> Option<Self> {
        let mut weights = vec![0.0f32; bins.num_bins()];
        for (freq, amplitude) in top_k.iter() {
            if let Some(bin) = bins.bin_index(freq) {
                weights[bin] += amplitude;
            }
        }

        let total: f32 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        weights.iter_mut().for_each(|w| *w /= total);

        Some(Self { weights })
    }

    /// All-zero signature of `len` bins
    pub fn zeros(len: usize) -> Self {
        Self {
            weights: vec![0.0; len],
        }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }
}

/// Signatures of every analysis window in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignedTrack {
    pub signatures: Vec<Signature>,
}

impl SignedTrack {
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Smallest power of two that covers one second of audio
pub fn window_width(sample_rate: u32) -> usize {
    (sample_rate.max(1) as usize).next_power_of_two()
}

/// Sign a track
///
/// Windows start every `window_width / 2` samples until the end of the
/// signal, so the last ones may be shorter than a full window. With the
/// default policy a track of N samples yields `ceil(N / step)` signatures.
pub fn sign_track(track: &Track, config: &SimilarityConfig) -> Result<SignedTrack> {
    let bins = NoteBins::for_sample_rate(track.sample_rate)?;
    let width = window_width(track.sample_rate);
    let step = width / 2;

    let mut extractor = SpectralExtractor::new(config.top_k);
    let mut signatures = Vec::with_capacity(track.len().div_ceil(step));
    let mut degenerate = 0usize;

    for (window_idx, start) in (0..track.len()).step_by(step).enumerate() {
        let end = (start + width).min(track.len());
        let top_k = extractor.extract(&track.samples[start..end], track.sample_rate);

        match Signature::from_top_k(&top_k, &bins) {
            Some(signature) => signatures.push(signature),
            None => {
                degenerate += 1;
                log::trace!("Window {} at sample {} has no spectral weight", window_idx, start);
                match config.degenerate_policy {
                    DegeneratePolicy::Zero => signatures.push(Signature::zeros(bins.num_bins())),
                    DegeneratePolicy::Skip => {}
                    DegeneratePolicy::Fail => {
                        return Err(SimilarityError::DegenerateHistogram { window: window_idx });
                    }
                }
            }
        }
    }

    if degenerate > 0 {
        log::warn!(
            "{} degenerate window(s) handled with policy {:?}",
            degenerate,
            config.degenerate_policy
        );
    }
    log::debug!(
        "Signed {} samples at {} Hz into {} windows (width {}, step {})",
        track.len(),
        track.sample_rate,
        signatures.len(),
        width,
        step
    );

    Ok(SignedTrack { signatures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn tone(freqs: &[f32], sample_rate: u32, len: usize) -> Track {
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs.iter().map(|f| 4000.0 * (2.0 * PI * f * t).sin()).sum()
            })
            .collect();
        Track::new(samples, sample_rate)
    }

    #[test]
    fn test_window_width() {
        assert_eq!(window_width(44100), 65536);
        assert_eq!(window_width(48000), 65536);
        assert_eq!(window_width(16000), 16384);
        assert_eq!(window_width(16384), 16384);
    }

    #[test]
    fn test_signature_sums_to_one() {
        let bins = NoteBins::for_sample_rate(16000).unwrap();
        let top_k = TopKFrequencies {
            frequencies: vec![440.0, 445.0, 880.0, 50.0],
            amplitudes: vec![3.0, 1.0, 2.0, 2.0],
        };
        let signature = Signature::from_top_k(&top_k, &bins).unwrap();

        assert_eq!(signature.len(), 90);
        assert_relative_eq!(signature.weights().iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert!(signature.weights().iter().all(|&w| w >= 0.0));

        let a4 = bins.bin_index(440.0).unwrap();
        let a5 = bins.bin_index(880.0).unwrap();
        assert_relative_eq!(signature.weights()[a4], 0.5);
        assert_relative_eq!(signature.weights()[a5], 0.25);
    }

    #[test]
    fn test_zero_weight_is_degenerate() {
        let bins = NoteBins::for_sample_rate(16000).unwrap();
        let silent = TopKFrequencies {
            frequencies: vec![100.0, 200.0],
            amplitudes: vec![0.0, 0.0],
        };
        assert!(Signature::from_top_k(&silent, &bins).is_none());
        assert!(Signature::from_top_k(&TopKFrequencies::default(), &bins).is_none());
    }

    #[test]
    fn test_window_count() {
        let config = SimilarityConfig::default();
        // step is 8192 at 16 kHz
        for (len, expected) in [(1, 1), (8192, 1), (8193, 2), (16000 * 3, 6)] {
            let track = tone(&[440.0], 16000, len);
            let signed = sign_track(&track, &config).unwrap();
            assert_eq!(signed.len(), expected, "len {}", len);
        }
        let empty = Track::new(vec![], 16000);
        assert!(sign_track(&empty, &config).unwrap().is_empty());
    }

    #[test]
    fn test_tone_lands_in_its_note() {
        let track = tone(&[440.0], 16000, 16384);
        let signed = sign_track(&track, &SimilarityConfig::default()).unwrap();
        let bins = NoteBins::for_sample_rate(16000).unwrap();
        let a4 = bins.bin_index(440.0).unwrap();

        let first = &signed.signatures[0];
        assert!(first.weights()[a4] > 0.9);
    }

    #[test]
    fn test_degenerate_policies() {
        // One window of tone followed by an equal run of digital silence;
        // the last two windows see only zeros
        let mut track = tone(&[440.0], 16000, 16384);
        track.samples.extend(std::iter::repeat(0.0).take(16384));

        let zero = SimilarityConfig::default();
        let signed = sign_track(&track, &zero).unwrap();
        assert_eq!(signed.len(), 4);
        assert!(!signed.signatures[1].is_zero());
        assert!(signed.signatures[2].is_zero());
        assert!(signed.signatures[3].is_zero());
        assert_eq!(signed.signatures[3].len(), 90);

        let skip = SimilarityConfig {
            degenerate_policy: DegeneratePolicy::Skip,
            ..Default::default()
        };
        let signed = sign_track(&track, &skip).unwrap();
        assert_eq!(signed.len(), 2);

        let fail = SimilarityConfig {
            degenerate_policy: DegeneratePolicy::Fail,
            ..Default::default()
        };
        assert_eq!(
            sign_track(&track, &fail),
            Err(SimilarityError::DegenerateHistogram { window: 2 })
        );
    }

    #[test]
    fn test_unsupported_rate() {
        let track = Track::new(vec![1000.0; 100], 8000);
        assert_eq!(
            sign_track(&track, &SimilarityConfig::default()),
            Err(SimilarityError::UnsupportedSampleRate(8000))
        );
    }
}
