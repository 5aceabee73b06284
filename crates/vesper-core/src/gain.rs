//! Scalar gain node.

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AudioNode, Inputs};

/// Sums its inputs and multiplies the mix by a scalar.
///
/// With no inputs the node outputs silence. Commonly used as the shared
/// output bus that several sources feed into.
#[derive(Debug, Clone)]
pub struct Gain {
    gain: f32,
}

impl Gain {
    /// Creates a gain node.
    pub fn new(_context: &AudioContext, gain: f32) -> Self {
        Self { gain }
    }

    /// Current linear gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Sets the linear gain applied from the next block.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }
}

impl AudioNode for Gain {
    fn process(&mut self, inputs: Inputs<'_>, output: &mut Buffer) {
        output.clear();
        if inputs.is_empty() {
            return;
        }
        inputs.sum_into(output);
        output.scale(self.gain);
    }
}
