//! Audio decoding for multiple formats
//!
//! Samples are kept on a 16-bit integer scale, which is the scale the
//! silence threshold is expressed in.

use super::AudioFormat;
use crate::track::Track;
use anyhow::{Context, Result};
use std::path::Path;

/// Full scale of 16-bit PCM
const I16_SCALE: f32 = 32768.0;

/// Decoded, interleaved audio
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    /// Convert to mono by averaging channels
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks(self.channels as usize)
            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
            .collect()
    }

    pub fn into_track(self) -> Track {
        let samples = if self.channels <= 1 {
            self.samples
        } else {
            self.to_mono()
        };
        Track::new(samples, self.sample_rate)
    }
}

/// Decode an audio file into a mono track
pub fn load_track(path: &Path) -> Result<Track> {
    if !path.exists() {
        anyhow::bail!("Audio file not found: {}", path.display());
    }

    let audio_data = match AudioFormat::from_path(path) {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        AudioFormat::Unknown => {
            anyhow::bail!("Unsupported audio format: {}", path.display());
        }
    };

    if audio_data.sample_rate == 0 {
        anyhow::bail!("No audio frames decoded from {}", path.display());
    }

    log::debug!(
        "Decoded {}: {} Hz, {} channel(s), {} samples",
        path.display(),
        audio_data.sample_rate,
        audio_data.channels,
        audio_data.samples.len()
    );

    Ok(audio_data.into_track())
}

/// Factor that maps integer PCM of `bits` width onto the 16-bit scale
fn int_scale(bits: u32) -> f32 {
    2.0_f32.powi(16 - bits as i32)
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<AudioData> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v * I16_SCALE))
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as u32);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(AudioData {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<AudioData> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read MP3 file: {}", path.display()))?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend(frame.data.iter().map(|&s| s as f32));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => anyhow::bail!("MP3 decode error in {}: {}", path.display(), e),
        }
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<AudioData> {
    let mut reader = claxon::FlacReader::open(path)
        .with_context(|| format!("Failed to open FLAC file: {}", path.display()))?;

    let info = reader.streaminfo();
    let scale = int_scale(info.bits_per_sample);
    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 * scale))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AudioData {
        samples,
        sample_rate: info.sample_rate,
        channels: info.channels as u16,
    })
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open OGG file: {}", path.display()))?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        samples.extend(packet.iter().map(|&s| s as f32));
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_wav(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("versim-{}-{}.wav", std::process::id(), name))
    }

    #[test]
    fn test_to_mono_averages_channels() {
        let audio = AudioData {
            samples: vec![100.0, 300.0, -50.0, 50.0],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(audio.to_mono(), vec![200.0, 0.0]);
        assert_eq!(audio.into_track().samples, vec![200.0, 0.0]);
    }

    #[test]
    fn test_int_scale() {
        assert_eq!(int_scale(16), 1.0);
        assert_eq!(int_scale(24), 1.0 / 256.0);
        assert_eq!(int_scale(8), 256.0);
    }

    #[test]
    fn test_decode_stereo_wav() {
        let path = temp_wav("stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for (left, right) in [(1000i16, 3000i16), (-400, 400), (0, 0)] {
            writer.write_sample(left).unwrap();
            writer.write_sample(right).unwrap();
        }
        writer.finalize().unwrap();

        let track = load_track(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(track.sample_rate, 22050);
        assert_eq!(track.samples, vec![2000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_track(Path::new("/nonexistent/track.wav")).is_err());
    }
}
