//! Decoded sample material and the loader seam that produces it.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use vesper_core::AudioContext;

/// Decoded, interleaved `f32` sample data.
///
/// The decoder is expected to deliver material already converted to the
/// engine's channel count and sample rate; playback copies samples one for
/// one into the render block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleData {
    samples: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl SampleData {
    /// Zero-length sample. Triggering it produces silence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps interleaved samples. A trailing partial frame is dropped.
    pub fn from_interleaved(mut samples: Vec<f32>, channels: usize) -> Self {
        let channels = channels.max(1);
        let frames = samples.len() / channels;
        samples.truncate(frames * channels);
        Self {
            samples,
            channels,
            frames,
        }
    }

    /// Total sample count (`frames * channels`).
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there is no material to play.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frame count.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Interleaved samples.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

/// Decodes a named asset into [`SampleData`] shaped for `context`.
///
/// Implementations never fail outright: a missing or corrupt file is
/// reported however the implementation logs and degrades to
/// [`SampleData::empty`], so the owning sampler still builds and plays
/// silence.
pub trait SampleLoader {
    /// Loads `file_name`, converted to the context's channel count and rate.
    fn load(&self, file_name: &str, context: &AudioContext) -> SampleData;
}

impl<F> SampleLoader for F
where
    F: Fn(&str, &AudioContext) -> SampleData,
{
    fn load(&self, file_name: &str, context: &AudioContext) -> SampleData {
        self(file_name, context)
    }
}
