//! Adapts fixed-size graph blocks to arbitrary device callback lengths.

use vesper_core::{AudioContext, Buffer};

/// Serves interleaved samples from block-sized renders.
///
/// Device callbacks rarely ask for exactly one block. `BlockStream` keeps
/// the last rendered block and a read position, calling the render closure
/// only when the block is used up. No allocation happens in [`fill`](Self::fill).
#[derive(Debug)]
pub struct BlockStream {
    block: Buffer,
    position: usize,
}

impl BlockStream {
    /// Creates a stream sized for `context`. The first `fill` renders.
    pub fn new(context: &AudioContext) -> Self {
        let block = Buffer::new(context);
        let position = block.len();
        Self { block, position }
    }

    /// Fills `data` with interleaved samples, rendering blocks as needed.
    pub fn fill(&mut self, data: &mut [f32], mut render: impl FnMut(&mut Buffer)) {
        if self.block.is_empty() {
            data.fill(0.0);
            return;
        }

        let mut written = 0;
        while written < data.len() {
            if self.position >= self.block.len() {
                render(&mut self.block);
                self.position = 0;
            }
            let available = &self.block.as_slice()[self.position..];
            let n = available.len().min(data.len() - written);
            data[written..written + n].copy_from_slice(&available[..n]);
            written += n;
            self.position += n;
        }
    }

    /// Resizes for a new context and drops any buffered samples.
    pub fn set_context(&mut self, context: &AudioContext) {
        self.block.set_context(context);
        self.position = self.block.len();
    }

    /// Samples still buffered from the last render.
    pub fn buffered(&self) -> usize {
        self.block.len() - self.position
    }
}
