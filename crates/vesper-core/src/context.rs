//! Block shape shared by every buffer and node in a graph.

/// Render block shape: frames per block, interleaved channel count and sample rate.
///
/// Every [`Buffer`](crate::Buffer) that takes part in arithmetic or node I/O
/// is sized from the same context. Changing it means reshaping every
/// dependent buffer, see [`AudioGraph::set_audio_context`](crate::AudioGraph::set_audio_context).
///
/// # Example
///
/// ```rust
/// use vesper_core::AudioContext;
///
/// let ctx = AudioContext::new(256, 2, 48000.0);
/// assert_eq!(ctx.buffer_len(), 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioContext {
    /// Frames rendered per block.
    pub block_size: usize,
    /// Interleaved channel count.
    pub channel_count: usize,
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl AudioContext {
    /// Creates a context from its three components.
    pub const fn new(block_size: usize, channel_count: usize, sample_rate: f32) -> Self {
        Self {
            block_size,
            channel_count,
            sample_rate,
        }
    }

    /// Total number of interleaved samples in one block.
    #[inline]
    pub const fn buffer_len(&self) -> usize {
        self.block_size * self.channel_count
    }

    /// Returns a copy with a different block size.
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}

impl Default for AudioContext {
    /// 512 frames, stereo, 44.1 kHz.
    fn default() -> Self {
        Self::new(512, 2, 44100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_len() {
        assert_eq!(AudioContext::new(4, 1, 48000.0).buffer_len(), 4);
        assert_eq!(AudioContext::new(128, 2, 48000.0).buffer_len(), 256);
    }

    #[test]
    fn test_with_block_size_keeps_other_fields() {
        let ctx = AudioContext::default().with_block_size(64);
        assert_eq!(ctx.block_size, 64);
        assert_eq!(ctx.channel_count, 2);
        assert_eq!(ctx.sample_rate, 44100.0);
    }
}
