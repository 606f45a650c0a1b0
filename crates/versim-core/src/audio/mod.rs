//! Audio loading
//!
//! Decodes WAV, MP3, FLAC and OGG files into mono tracks, and enumerates
//! the supported files of a directory.

mod decoder;

pub use decoder::{load_track, AudioData};

use crate::comparison::NamedTrack;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}

/// Name a track is reported under: the file name without its extension
pub fn track_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Supported audio files in `dir`, sorted by file name
pub fn list_tracks(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && AudioFormat::from_path(path).is_supported())
        .collect();
    paths.sort();

    Ok(paths)
}

/// Decode every supported file in `dir`, keeping directory order
pub fn load_directory(dir: &Path) -> Result<Vec<NamedTrack>> {
    let paths = list_tracks(dir)?;
    log::info!("Found {} audio files in {}", paths.len(), dir.display());

    paths
        .par_iter()
        .map(|path| -> Result<NamedTrack> {
            let track = load_track(path)?;
            Ok(NamedTrack::new(track_name(path), track))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioFormat::from_path(Path::new("a/b.wav")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("song.FLAC")), AudioFormat::Flac);
        assert_eq!(AudioFormat::from_path(Path::new("song.ogg")), AudioFormat::Ogg);
        assert_eq!(AudioFormat::from_path(Path::new("notes.txt")), AudioFormat::Unknown);
        assert_eq!(AudioFormat::from_path(Path::new("noext")), AudioFormat::Unknown);
    }

    #[test]
    fn test_track_name_strips_directory_and_extension() {
        assert_eq!(track_name(Path::new("/music/live/take_2.wav")), "take_2");
        assert_eq!(track_name(Path::new("studio.mp3")), "studio");
    }

    #[test]
    fn test_list_tracks_rejects_missing_dir() {
        assert!(list_tracks(Path::new("/nonexistent/versim")).is_err());
    }
}
