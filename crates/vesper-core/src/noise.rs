//! White noise source node.

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AudioNode, Inputs};

const DEFAULT_SEED: u32 = 0x1234_5678;

/// Uniform white noise in `[-1, 1]`, ignoring any inputs.
///
/// Uses a xorshift32 PRNG, so output is deterministic for a given seed and
/// the render path never allocates or calls into the OS.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    seed: u32,
    state: u32,
}

impl NoiseGenerator {
    /// Creates a generator with the default seed.
    pub fn new(_context: &AudioContext) -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates a generator with an explicit seed. A zero seed is replaced
    /// with the default, since xorshift would stay at zero forever.
    pub fn with_seed(seed: u32) -> Self {
        let seed = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { seed, state: seed }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        ((x as i32 as f32) / (i32::MAX as f32)).clamp(-1.0, 1.0)
    }
}

impl AudioNode for NoiseGenerator {
    fn process(&mut self, _inputs: Inputs<'_>, output: &mut Buffer) {
        for sample in output.as_mut_slice() {
            *sample = self.next_sample();
        }
    }

    fn reset(&mut self) {
        self.state = self.seed;
    }
}
