//! Configuration parameters for version similarity
//!
//! Defaults reproduce the behaviour the scores were tuned with.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Samples at or below this value count as lead-in silence (16-bit PCM scale)
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 250.0;

/// Number of dominant spectral components kept per window
pub const DEFAULT_TOP_K: usize = 20;

/// What to do with a window whose histogram carries no weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Emit an all-zero signature for the window
    #[default]
    Zero,
    /// Drop the window from the signed track
    Skip,
    /// Abort signing with `SimilarityError::DegenerateHistogram`
    Fail,
}

/// How batch comparison deals with tracks of different sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatePolicy {
    /// The first track fixes the reference rate, mismatching tracks are skipped
    #[default]
    FirstTrack,
    /// Every track must share one rate, otherwise the batch fails up front
    Uniform,
}

/// Algorithm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    // Silence trimming
    pub silence_threshold: f32,
    pub trim_silence: bool,

    // Spectral features
    pub top_k: usize,
    pub degenerate_policy: DegeneratePolicy,

    // Comparison
    pub rate_policy: RatePolicy,
    pub length_tolerance_windows: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            trim_silence: true,

            top_k: DEFAULT_TOP_K,
            degenerate_policy: DegeneratePolicy::Zero,

            rate_policy: RatePolicy::FirstTrack,
            length_tolerance_windows: 2,
        }
    }
}

impl SimilarityConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        let config: SimilarityConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_k == 0 {
            anyhow::bail!("top_k must be > 0");
        }
        if !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            anyhow::bail!("silence_threshold must be a finite value >= 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimilarityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 20);
        assert_eq!(config.silence_threshold, 250.0);
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let config = SimilarityConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimilarityConfig = toml::from_str(
            r#"
            top_k = 12
            degenerate_policy = "skip"
            rate_policy = "uniform"
            "#,
        )
        .unwrap();

        assert_eq!(config.top_k, 12);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Skip);
        assert_eq!(config.rate_policy, RatePolicy::Uniform);
        assert!(config.trim_silence);
        assert_eq!(config.silence_threshold, DEFAULT_SILENCE_THRESHOLD);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SimilarityConfig::load(Path::new("/nonexistent/versim.toml"));
        assert!(result.is_err());
    }
}
