//! Versim Core - Music Version Similarity Library
//!
//! Estimates how similar two recordings of the same piece are. Each track
//! is trimmed of lead-in silence, cut into half-overlapping windows, and
//! every window is reduced to a distribution of dominant piano notes. Two
//! such fingerprints are compared window by window into a score in [0, 1].

pub mod audio;
pub mod comparison;
pub mod config;
pub mod error;
pub mod notes;
pub mod signature;
pub mod spectrum;
pub mod track;

pub use comparison::{
    compare, compare_all, fingerprint, signatures_similarity, BatchReport, NamedTrack, PairScore,
    SimilarityScore, SkipReason, SkippedTrack,
};
pub use config::{DegeneratePolicy, RatePolicy, SimilarityConfig};
pub use error::SimilarityError;
pub use notes::NoteBins;
pub use signature::{sign_track, Signature, SignedTrack};
pub use spectrum::{SpectralExtractor, TopKFrequencies};
pub use track::{trim, Track};

/// Compare two audio files
pub fn compare_files(
    path_a: &std::path::Path,
    path_b: &std::path::Path,
    config: &SimilarityConfig,
) -> anyhow::Result<PairScore> {
    let track_a = audio::load_track(path_a)?;
    let track_b = audio::load_track(path_b)?;

    let score = compare(&track_a, &track_b, config)?;

    Ok(PairScore {
        score,
        name_a: audio::track_name(path_a),
        name_b: audio::track_name(path_b),
    })
}
