//! WAV decoding into engine-shaped sample data, and WAV writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::{Path, PathBuf};
use vesper_core::AudioContext;
use vesper_sampler::{SampleData, SampleLoader};

/// WAV file specification used by [`write_wav`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth. 32 writes IEEE float, anything else writes integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Decodes a WAV file to interleaved `f32` with `channels` channels at
/// `sample_rate` Hz.
///
/// Integer PCM is scaled to `[-1, 1)`. Channel counts are converted with
/// [`remap_channels`] and rates with [`resample_linear`].
pub fn decode_wav<P: AsRef<Path>>(path: P, channels: usize, sample_rate: f32) -> Result<SampleData> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(Error::UnsupportedFormat("WAV file declares 0 channels".into()));
    }

    let mut raw = Vec::with_capacity(reader.len() as usize);
    let read_error = match spec.sample_format {
        SampleFormat::Float => read_until_error(reader.into_samples::<f32>(), &mut raw, |v| v),
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            read_until_error(reader.into_samples::<i32>(), &mut raw, |v| v as f32 / full_scale)
        }
    };

    let file_channels = spec.channels as usize;
    if let Some(err) = read_error {
        raw.truncate(raw.len() - raw.len() % file_channels);
        tracing::warn!(error = %err, frames = raw.len() / file_channels, "short wav read, keeping decoded frames");
    }

    let channels = channels.max(1);
    let remapped = remap_channels(&raw, file_channels, channels);
    let resampled = resample_linear(&remapped, channels, spec.sample_rate as f32, sample_rate);

    tracing::debug!(
        file_channels = spec.channels,
        file_rate = spec.sample_rate,
        frames = resampled.len() / channels,
        "decoded wav"
    );
    Ok(SampleData::from_interleaved(resampled, channels))
}

/// Pushes converted samples into `out` until the reader is exhausted or
/// fails. Returns the error, if any.
fn read_until_error<T>(
    samples: impl Iterator<Item = hound::Result<T>>,
    out: &mut Vec<f32>,
    convert: impl Fn(T) -> f32,
) -> Option<hound::Error> {
    for sample in samples {
        match sample {
            Ok(v) => out.push(convert(v)),
            Err(err) => return Some(err),
        }
    }
    None
}

/// Converts interleaved audio from `from` to `to` channels.
///
/// Mono is copied to every output channel, and anything mixed down to mono
/// is averaged. Other conversions keep the channels both layouts share and
/// fill extra output channels by cycling through the input channels.
pub fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    let from = from.max(1);
    let to = to.max(1);
    if from == to {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|c| frame[c % from]));
        }
    }
    out
}

/// Linearly resamples interleaved audio from `from_rate` to `to_rate`.
///
/// Output length is `floor(frames * to_rate / from_rate)` frames. Equal
/// rates return the input unchanged.
pub fn resample_linear(samples: &[f32], channels: usize, from_rate: f32, to_rate: f32) -> Vec<f32> {
    let channels = channels.max(1);
    let frames = samples.len() / channels;
    if frames == 0 || from_rate <= 0.0 || to_rate <= 0.0 || from_rate == to_rate {
        return samples[..frames * channels].to_vec();
    }

    let step = f64::from(from_rate) / f64::from(to_rate);
    let out_frames = (frames as f64 / step).floor() as usize;
    let mut out = Vec::with_capacity(out_frames * channels);

    for i in 0..out_frames {
        let pos = i as f64 * step;
        let base = (pos.floor() as usize).min(frames - 1);
        let next = (base + 1).min(frames - 1);
        let frac = (pos - base as f64) as f32;
        for c in 0..channels {
            let a = samples[base * channels + c];
            let b = samples[next * channels + c];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

/// Writes interleaved samples to a WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
        for &sample in samples {
            let quantized = (sample * full_scale).clamp(-full_scale, full_scale - 1.0) as i32;
            writer.write_sample(quantized)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Loads WAV samples from a directory.
///
/// Failures never abort: a missing or unreadable file is logged and
/// replaced by an empty sample, so the sampler that asked for it plays
/// silence.
#[derive(Debug, Clone)]
pub struct WavLoader {
    samples_dir: PathBuf,
}

impl WavLoader {
    /// Creates a loader resolving file names against `samples_dir`.
    pub fn new(samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            samples_dir: samples_dir.into(),
        }
    }

    /// Directory file names are resolved against.
    pub fn samples_dir(&self) -> &Path {
        &self.samples_dir
    }
}

impl SampleLoader for WavLoader {
    fn load(&self, file_name: &str, context: &AudioContext) -> SampleData {
        let path = self.samples_dir.join(file_name);
        match decode_wav(&path, context.channel_count, context.sample_rate) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load sample");
                SampleData::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remap_mono_to_stereo() {
        assert_eq!(
            remap_channels(&[0.1, 0.2], 1, 2),
            vec![0.1, 0.1, 0.2, 0.2]
        );
    }

    #[test]
    fn test_remap_stereo_to_mono_averages() {
        let mono = remap_channels(&[0.2, 0.4, -1.0, 1.0], 2, 1);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert_eq!(mono[1], 0.0);
    }

    #[test]
    fn test_remap_stereo_to_quad_cycles() {
        assert_eq!(
            remap_channels(&[1.0, 2.0], 2, 4),
            vec![1.0, 2.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_resample_identity() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&input, 1, 44100.0, 44100.0), input);
    }

    #[test]
    fn test_resample_upsample_interpolates() {
        let out = resample_linear(&[0.0, 1.0, 2.0, 3.0], 1, 1.0, 2.0);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.0]);
    }

    #[test]
    fn test_resample_downsample_keeps_channels() {
        let out = resample_linear(&[0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0], 2, 2.0, 1.0);
        assert_eq!(out, vec![0.0, 10.0, 2.0, 12.0]);
    }

    #[test]
    fn test_decode_float_wav_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let samples = vec![0.5, -0.5, 0.25, -0.25];
        write_wav(
            &path,
            &samples,
            WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 32,
            },
        )
        .unwrap();

        let data = decode_wav(&path, 2, 48000.0).unwrap();
        assert_eq!(data.channels(), 2);
        assert_eq!(data.frames(), 2);
        assert_eq!(data.as_slice(), samples.as_slice());
    }

    #[test]
    fn test_decode_int_wav_scales() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("int.wav");
        write_wav(
            &path,
            &[0.5, -0.5],
            WavSpec {
                channels: 1,
                sample_rate: 48000,
                bits_per_sample: 16,
            },
        )
        .unwrap();

        let data = decode_wav(&path, 1, 48000.0).unwrap();
        assert_eq!(data.as_slice(), &[0.5, -0.5]);
    }

    #[test]
    fn test_decode_converts_to_engine_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono22k.wav");
        write_wav(
            &path,
            &[0.0, 1.0],
            WavSpec {
                channels: 1,
                sample_rate: 22050,
                bits_per_sample: 32,
            },
        )
        .unwrap();

        let data = decode_wav(&path, 2, 44100.0).unwrap();
        assert_eq!(data.channels(), 2);
        assert_eq!(data.as_slice(), &[0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_decode_truncated_file_keeps_read_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cut.wav");
        let samples: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
        write_wav(
            &path,
            &samples,
            WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 32,
            },
        )
        .unwrap();

        // Cut 402 bytes: 100 whole samples plus half of another.
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 402]).unwrap();

        let data = decode_wav(&path, 2, 48000.0).unwrap();
        assert_eq!(data.channels(), 2);
        assert_eq!(data.frames(), 449, "partial trailing frame is dropped");
        assert_eq!(data.as_slice(), &samples[..898]);
    }

    #[test]
    fn test_decode_missing_file_errors() {
        let result = decode_wav("/nonexistent/nothing.wav", 2, 48000.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_loader_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let loader = WavLoader::new(dir.path());
        let data = loader.load("missing.wav", &AudioContext::default());
        assert!(data.is_empty());
    }

    #[test]
    fn test_loader_resolves_against_dir() {
        let dir = tempdir().unwrap();
        write_wav(dir.path().join("hit.wav"), &[0.25; 8], WavSpec::default()).unwrap();
        let loader = WavLoader::new(dir.path());
        let data = loader.load("hit.wav", &AudioContext::new(4, 2, 48000.0));
        assert_eq!(data.frames(), 4);
        assert_eq!(loader.samples_dir(), dir.path());
    }
}
