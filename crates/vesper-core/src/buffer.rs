//! Interleaved multichannel sample buffer.
//!
//! A [`Buffer`] is a flat run of `frames * channels` samples laid out
//! frame-major (`[L0, R0, L1, R1, ...]`). Buffers that interact (summing,
//! node I/O) must share the same shape; mixing shapes is a programming error
//! and panics.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::ops::{Add, AddAssign, Index, IndexMut};

use crate::context::AudioContext;

/// Fixed-shape interleaved audio buffer.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, Buffer};
///
/// let ctx = AudioContext::new(4, 2, 48000.0);
/// let mut a = Buffer::new(&ctx);
/// let mut b = Buffer::new(&ctx);
/// a.set_sample(0, 1, 0.5);
/// b.set_sample(0, 1, 0.25);
/// a += &b;
/// assert_eq!(a.sample(0, 1), 0.75);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buffer {
    data: Vec<f32>,
    channels: usize,
    frames: usize,
    sample_rate: f32,
}

impl Buffer {
    /// Creates a zeroed buffer shaped by `context`.
    pub fn new(context: &AudioContext) -> Self {
        Self {
            data: vec![0.0; context.buffer_len()],
            channels: context.channel_count,
            frames: context.block_size,
            sample_rate: context.sample_rate,
        }
    }

    /// Creates a buffer holding `samples`, which must be a whole number of
    /// frames for `channels`.
    ///
    /// The frame count is derived from the data, so the result may be longer
    /// or shorter than one render block. Used for decoded sample material.
    pub fn from_interleaved(samples: Vec<f32>, channels: usize, sample_rate: f32) -> Self {
        let channels = channels.max(1);
        assert!(
            samples.len() % channels == 0,
            "sample count {} is not a multiple of {} channels",
            samples.len(),
            channels
        );
        Self {
            frames: samples.len() / channels,
            data: samples,
            channels,
            sample_rate,
        }
    }

    /// Number of interleaved samples (`frames * channels`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Interleaved channel count.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate this buffer was shaped for.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Returns true if `other` has the same frame and channel counts.
    #[inline]
    pub fn same_shape(&self, other: &Buffer) -> bool {
        self.frames == other.frames && self.channels == other.channels
    }

    /// Fills the buffer with zeros.
    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Reshapes to `context` and zeroes every sample.
    ///
    /// Allocates when the new shape is larger. Setup path only.
    pub fn set_context(&mut self, context: &AudioContext) {
        self.channels = context.channel_count;
        self.frames = context.block_size;
        self.sample_rate = context.sample_rate;
        self.data.clear();
        self.data.resize(context.buffer_len(), 0.0);
    }

    /// Changes the frame count, keeping existing samples and zero-filling
    /// any new tail.
    pub fn resize_frames(&mut self, frames: usize) {
        self.frames = frames;
        self.data.resize(frames * self.channels, 0.0);
    }

    /// Reads one sample by frame and channel.
    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        self.data[frame * self.channels + channel]
    }

    /// Writes one sample by frame and channel.
    #[inline]
    pub fn set_sample(&mut self, frame: usize, channel: usize, value: f32) {
        self.data[frame * self.channels + channel] = value;
    }

    /// Iterates one channel's samples.
    pub fn channel_iter(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels.max(1))
            .copied()
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw interleaved samples, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copies another buffer of the same shape into this one.
    pub fn copy_from(&mut self, other: &Buffer) {
        self.assert_same_shape(other);
        self.data.copy_from_slice(&other.data);
    }

    /// Adds another buffer's samples elementwise (mix/accumulate).
    #[inline]
    pub fn accumulate_from(&mut self, other: &Buffer) {
        self.assert_same_shape(other);
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst += *src;
        }
    }

    /// Multiplies every sample by `gain`.
    #[inline]
    pub fn scale(&mut self, gain: f32) {
        for sample in &mut self.data {
            *sample *= gain;
        }
    }

    #[inline]
    fn assert_same_shape(&self, other: &Buffer) {
        assert!(
            self.same_shape(other),
            "buffer shape mismatch: {}x{} vs {}x{}",
            self.frames,
            self.channels,
            other.frames,
            other.channels
        );
    }
}

impl Index<usize> for Buffer {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl IndexMut<usize> for Buffer {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.data[index]
    }
}

impl AddAssign<&Buffer> for Buffer {
    fn add_assign(&mut self, rhs: &Buffer) {
        self.accumulate_from(rhs);
    }
}

impl Add<&Buffer> for &Buffer {
    type Output = Buffer;

    /// Allocates a new buffer. Keep out of the render path.
    fn add(self, rhs: &Buffer) -> Buffer {
        let mut out = self.clone();
        out += rhs;
        out
    }
}
