//! Fingerprint comparison and batch ranking
//!
//! Two signed tracks are compared window by window. Each aligned pair of
//! signatures contributes its total variation distance, and the score is
//! one minus the mean distance, rounded to two decimals.

use crate::config::{RatePolicy, SimilarityConfig};
use crate::error::{Result, SimilarityError};
use crate::signature::{sign_track, Signature, SignedTrack};
use crate::track::Track;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;


/// Similarity in [0, 1] rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityScore(f64);

impl SimilarityScore {
    /// Round to two decimals, ties to even, and clamp
    pub fn new(raw: f64) -> Self {
        Self(((raw * 100.0).round_ties_even() / 100.0).clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Score of one unordered pair of named tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    pub score: SimilarityScore,
    /// Lexicographically smaller name in batch results
    pub name_a: String,
    pub name_b: String,
}

/// A loaded track and the name it is reported under
#[derive(Debug, Clone)]
pub struct NamedTrack {
    pub name: String,
    pub track: Track,
}

impl NamedTrack {
    pub fn new(name: impl Into<String>, track: Track) -> Self {
        Self {
            name: name.into(),
            track,
        }
    }
}

/// Why a track was left out of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    RateMismatch { sample_rate: u32, reference_rate: u32 },
    EmptyFingerprint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTrack {
    pub name: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of `compare_all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Pair scores, highest first
    pub results: Vec<PairScore>,
    pub skipped: Vec<SkippedTrack>,
}

/// Total variation distance between two signatures
///
/// Both are distributions over the same bins, so half the L1 distance lies
/// in [0, 1]. A zero signature sits at 0.5 from any distribution.
pub fn signature_distance(a: &Signature, b: &Signature) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let l1: f64 = a
        .weights()
        .iter()
        .zip(b.weights())
        .map(|(&x, &y)| (x as f64 - y as f64).abs())
        .sum();
    l1 / 2.0
}

/// Score two signed tracks
///
/// Only the first `min(a.len(), b.len())` windows are compared; trailing
/// windows of the longer track do not affect the score.
pub fn signatures_similarity(
    a: &SignedTrack,
    b: &SignedTrack,
    config: &SimilarityConfig,
) -> Result<SimilarityScore> {
    let aligned = a.len().min(b.len());
    if aligned == 0 {
        return Err(SimilarityError::EmptyAlignment);
    }

    let length_diff = a.len().abs_diff(b.len());
    if length_diff > config.length_tolerance_windows {
        log::debug!(
            "Fingerprint lengths differ by {} windows ({} vs {}), comparing first {}",
            length_diff,
            a.len(),
            b.len(),
            aligned
        );
    }

    let total: f64 = (0..aligned)
        .map(|i| signature_distance(&a.signatures[i], &b.signatures[i]))
        .sum();
    let mean = total / aligned as f64;

    Ok(SimilarityScore::new(1.0 - mean))
}

/// Trim (if enabled) and sign a track
pub fn fingerprint(track: &Track, config: &SimilarityConfig) -> Result<SignedTrack> {
    if config.trim_silence {
        sign_track(&track.trimmed(config.silence_threshold), config)
    } else {
        sign_track(track, config)
    }
}

/// Compare two loaded tracks
///
/// Tracks at different sample rates would land in misaligned windows and
/// bins, so they are rejected with `RateMismatch` before any work is done.
pub fn compare(a: &Track, b: &Track, config: &SimilarityConfig) -> Result<SimilarityScore> {
    if a.sample_rate != b.sample_rate {
        log::warn!(
            "Tracks do not have the same sample rate ({} Hz vs {} Hz)",
            a.sample_rate,
            b.sample_rate
        );
        return Err(SimilarityError::RateMismatch {
            left: a.sample_rate,
            right: b.sample_rate,
        });
    }

    let signed_a = fingerprint(a, config)?;
    let signed_b = fingerprint(b, config)?;
    signatures_similarity(&signed_a, &signed_b, config)
}

/// Compare every unordered pair of tracks
///
/// The first track fixes the reference sample rate. Depending on
/// `config.rate_policy`, tracks at another rate are either skipped and
/// reported, or fail the whole batch. Tracks that trim down to nothing are
/// skipped too. Within each pair the names are ordered lexicographically;
/// results are sorted by descending score, ties by `(name_a, name_b)`.
pub fn compare_all(tracks: &[NamedTrack], config: &SimilarityConfig) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let Some(reference_rate) = tracks.first().map(|t| t.track.sample_rate) else {
        return Ok(report);
    };

    let mut accepted = Vec::with_capacity(tracks.len());
    for named in tracks {
        let rate = named.track.sample_rate;
        if rate == reference_rate {
            accepted.push(named);
            continue;
        }
        match config.rate_policy {
            RatePolicy::Uniform => {
                return Err(SimilarityError::RateMismatch {
                    left: reference_rate,
                    right: rate,
                });
            }
            RatePolicy::FirstTrack => {
                log::warn!(
                    "{} does not have the same sample rate ({} Hz, expected {} Hz)",
                    named.name,
                    rate,
                    reference_rate
                );
                report.skipped.push(SkippedTrack {
                    name: named.name.clone(),
                    reason: SkipReason::RateMismatch {
                        sample_rate: rate,
                        reference_rate,
                    },
                });
            }
        }
    }

    log::info!("Signing {} tracks at {} Hz", accepted.len(), reference_rate);
    let signed: Vec<(&NamedTrack, SignedTrack)> = accepted
        .par_iter()
        .map(|named| fingerprint(&named.track, config).map(|signed| (*named, signed)))
        .collect::<Result<Vec<_>>>()?;

    let mut usable = Vec::with_capacity(signed.len());
    for (named, fp) in signed {
        if fp.is_empty() {
            log::warn!("{} has no audible content, skipping", named.name);
            report.skipped.push(SkippedTrack {
                name: named.name.clone(),
                reason: SkipReason::EmptyFingerprint,
            });
        } else {
            usable.push((named, fp));
        }
    }

    let pairs: Vec<(usize, usize)> = (0..usable.len())
        .flat_map(|i| ((i + 1)..usable.len()).map(move |j| (i, j)))
        .collect();
    log::info!("Scoring {} pairs", pairs.len());

    report.results = pairs
        .par_iter()
        .map(|&(i, j)| -> Result<PairScore> {
            let (named_a, fp_a) = &usable[i];
            let (named_b, fp_b) = &usable[j];
            let score = signatures_similarity(fp_a, fp_b, config)?;
            log::trace!("{} / {}: {}", named_a.name, named_b.name, score);
            let (name_a, name_b) = if named_a.name <= named_b.name {
                (&named_a.name, &named_b.name)
            } else {
                (&named_b.name, &named_a.name)
            };
            Ok(PairScore {
                score,
                name_a: name_a.clone(),
                name_b: name_b.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    report.results.sort_by(|a, b| {
        b.score
            .value()
            .total_cmp(&a.score.value())
            .then_with(|| a.name_a.cmp(&b.name_a))
            .then_with(|| a.name_b.cmp(&b.name_b))
    });

    Ok(report)
}
