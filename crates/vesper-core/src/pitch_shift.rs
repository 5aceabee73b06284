//! Variable-delay pitch shifter with two crossfaded taps.
//!
//! Input is written into a ring buffer one block long. A running fractional
//! delay drifts by `1 - ratio` per sample: pitching up shrinks the delay,
//! pitching down grows it. Two read taps half a ring apart are blended with a
//! triangle window keyed to the delay's position in the ring, so the wrap of
//! one tap is hidden while the other is at full gain. Each tap is read with
//! 4-point cubic interpolation.
//!
//! The ring is exactly one block (`block_size * channel_count` samples).
//! Very small blocks or extreme ratios approach the limits set by the ring
//! length and the fixed safety margin.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AudioNode, Inputs};

/// Distance in samples kept between the write head and tap A.
pub const SAFETY_MARGIN: f64 = 20.0;

/// Converts a semitone offset to a playback-rate ratio.
#[inline]
pub fn semitones_to_ratio(semitones: i32) -> f64 {
    libm::pow(2.0, f64::from(semitones) / 12.0)
}

/// 4-point cubic interpolation between `s0` and `s1`.
///
/// `sm1` and `s2` are the outer neighbours; `frac` is in `[0, 1)`.
#[inline]
pub fn cubic_interpolate(sm1: f32, s0: f32, s1: f32, s2: f32, frac: f32) -> f32 {
    let a = -0.5 * sm1 + 1.5 * s0 - 1.5 * s1 + 0.5 * s2;
    let b = sm1 - 2.5 * s0 + 2.0 * s1 - 0.5 * s2;
    let c = -0.5 * sm1 + 0.5 * s1;
    let d = s0;
    d + frac * (c + frac * (b + frac * a))
}

/// Wraps `x` into `[0, len)`.
#[inline]
fn wrap(x: f64, len: f64) -> f64 {
    let wrapped = x - len * libm::floor(x / len);
    if wrapped >= len { 0.0 } else { wrapped }
}

/// Dual-tap ring-buffer pitch shifter.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, Buffer, PitchShift};
///
/// let ctx = AudioContext::new(256, 1, 48000.0);
/// let mut shifter = PitchShift::new(&ctx, 7);
/// let mut block = Buffer::new(&ctx);
/// shifter.apply_to_buffer(&mut block);
/// assert!((shifter.ratio() - 1.498).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct PitchShift {
    ring: Vec<f32>,
    write_idx: usize,
    delay: f64,
    ratio: f64,
}

impl PitchShift {
    /// Creates a shifter with a ring sized to one block of `context`.
    pub fn new(context: &AudioContext, semitones: i32) -> Self {
        Self {
            ring: vec![0.0; context.buffer_len()],
            write_idx: 0,
            delay: 0.0,
            ratio: semitones_to_ratio(semitones),
        }
    }

    /// Sets the shift in semitones.
    pub fn set_pitch(&mut self, semitones: i32) {
        self.ratio = semitones_to_ratio(semitones);
    }

    /// Current playback-rate ratio (`2^(semitones/12)`).
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Ring length in samples.
    pub fn ring_len(&self) -> usize {
        self.ring.len()
    }

    /// Zeroes the ring and rewinds the delay and write head.
    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.write_idx = 0;
        self.delay = 0.0;
    }

    /// Pitch-shifts `buffer` in place, one interleaved sample at a time.
    pub fn apply_to_buffer(&mut self, buffer: &mut Buffer) {
        let size = self.ring.len();
        if size == 0 {
            return;
        }
        let ring_size = size as f64;

        for sample in buffer.as_mut_slice() {
            self.ring[self.write_idx] = *sample;

            self.delay = wrap(self.delay + (1.0 - self.ratio), ring_size);

            let tap_a = wrap(self.write_idx as f64 - (self.delay + SAFETY_MARGIN), ring_size);
            let tap_b = wrap(tap_a + ring_size * 0.5, ring_size);

            let phase = (self.delay / ring_size) as f32;
            let gain_a = 1.0 - (phase * 2.0 - 1.0).abs();
            let gain_b = 1.0 - gain_a;

            *sample = self.read_cubic(tap_a) * gain_a + self.read_cubic(tap_b) * gain_b;

            self.write_idx = (self.write_idx + 1) % size;
        }
    }

    #[inline]
    fn read_cubic(&self, position: f64) -> f32 {
        let size = self.ring.len() as isize;
        let base = libm::floor(position);
        let frac = (position - base) as f32;
        let i = base as isize;
        let at = |offset: isize| self.ring[(i + offset).rem_euclid(size) as usize];
        cubic_interpolate(at(-1), at(0), at(1), at(2), frac)
    }
}

impl AudioNode for PitchShift {
    fn process(&mut self, inputs: Inputs<'_>, output: &mut Buffer) {
        output.clear();
        if inputs.is_empty() {
            return;
        }
        inputs.sum_into(output);
        self.apply_to_buffer(output);
    }

    fn set_context(&mut self, context: &AudioContext) {
        self.ring.clear();
        self.ring.resize(context.buffer_len(), 0.0);
        self.write_idx = 0;
        self.delay = 0.0;
    }

    fn reset(&mut self) {
        PitchShift::reset(self);
    }
}
