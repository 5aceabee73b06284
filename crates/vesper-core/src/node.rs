//! The node processing contract.
//!
//! Every unit the graph schedules implements [`AudioNode`]. The graph owns
//! each node behind a `Box<dyn AudioNode>` and calls [`AudioNode::process`]
//! once per block with the current outputs of the node's direct
//! predecessors, in edge-insertion order.
//!
//! ## Real-time rules
//!
//! `process` runs on the audio thread. It may only touch the node's own
//! state and output buffer, and must not allocate, lock, or do I/O.
//! [`AudioNode::set_context`] is a setup-path call and may reallocate.

use core::any::Any;

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::graph::NodeId;

/// Downcast support for boxed nodes.
///
/// Blanket-implemented for every `'static` type, so node authors never
/// implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit in the processing graph.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioNode, Buffer, Inputs};
///
/// struct Invert;
///
/// impl AudioNode for Invert {
///     fn process(&mut self, inputs: Inputs<'_>, output: &mut Buffer) {
///         output.clear();
///         inputs.sum_into(output);
///         output.scale(-1.0);
///     }
/// }
/// ```
pub trait AudioNode: AsAny + Send {
    /// Renders one block into `output`.
    fn process(&mut self, inputs: Inputs<'_>, output: &mut Buffer);

    /// Adopts a new block shape. Nodes holding context-sized state resize it here.
    fn set_context(&mut self, _context: &AudioContext) {}

    /// Clears internal DSP state without changing parameters.
    fn reset(&mut self) {}
}

/// Ordered read-only view of a node's predecessor buffers.
///
/// Inside the graph the view resolves source ids against the graph's output
/// table without collecting them. Outside the graph (tests, in-place use)
/// it wraps a plain slice of buffer references.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    repr: Repr<'a>,
}

#[derive(Clone, Copy)]
enum Repr<'a> {
    Buffers(&'a [&'a Buffer]),
    Routed {
        sources: &'a [NodeId],
        outputs: &'a [Buffer],
    },
}

impl<'a> Inputs<'a> {
    /// No inputs.
    pub const fn none() -> Self {
        Self {
            repr: Repr::Buffers(&[]),
        }
    }

    /// Wraps an explicit list of input buffers.
    pub const fn from_buffers(buffers: &'a [&'a Buffer]) -> Self {
        Self {
            repr: Repr::Buffers(buffers),
        }
    }

    /// Resolves `sources` against the graph's per-node output table.
    pub(crate) const fn routed(sources: &'a [NodeId], outputs: &'a [Buffer]) -> Self {
        Self {
            repr: Repr::Routed { sources, outputs },
        }
    }

    /// Number of input buffers, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        match self.repr {
            Repr::Buffers(buffers) => buffers.len(),
            Repr::Routed { sources, .. } => sources.len(),
        }
    }

    /// Returns true if the node has no predecessors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `index`-th input buffer.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a Buffer> {
        match self.repr {
            Repr::Buffers(buffers) => buffers.get(index).copied(),
            Repr::Routed { sources, outputs } => sources
                .get(index)
                .and_then(|id| outputs.get(id.index() as usize)),
        }
    }

    /// Iterates input buffers in edge-insertion order.
    pub fn iter(&self) -> InputsIter<'a> {
        InputsIter {
            inputs: *self,
            index: 0,
        }
    }

    /// Adds every input buffer into `output`.
    ///
    /// Does not clear `output` first.
    #[inline]
    pub fn sum_into(&self, output: &mut Buffer) {
        for input in self.iter() {
            output.accumulate_from(input);
        }
    }
}

impl<'a> IntoIterator for Inputs<'a> {
    type Item = &'a Buffer;
    type IntoIter = InputsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`Inputs`].
pub struct InputsIter<'a> {
    inputs: Inputs<'a>,
    index: usize,
}

impl<'a> Iterator for InputsIter<'a> {
    type Item = &'a Buffer;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.inputs.len() {
            let item = self.inputs.get(self.index);
            self.index += 1;
            if item.is_some() {
                return item;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_empty() {
        let inputs = Inputs::none();
        assert!(inputs.is_empty());
        assert_eq!(inputs.iter().count(), 0);
    }

    #[test]
    fn test_sum_into_counts_duplicates() {
        let a = Buffer::from_interleaved(vec![1.0, 2.0], 1, 48000.0);
        let list = [&a, &a];
        let inputs = Inputs::from_buffers(&list);
        let mut out = Buffer::from_interleaved(vec![0.0, 0.0], 1, 48000.0);
        inputs.sum_into(&mut out);
        assert_eq!(out.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn test_routed_view_follows_source_order() {
        let outputs = vec![
            Buffer::from_interleaved(vec![1.0], 1, 48000.0),
            Buffer::from_interleaved(vec![2.0], 1, 48000.0),
        ];
        let sources = [NodeId(1), NodeId(0), NodeId(1)];
        let inputs = Inputs::routed(&sources, &outputs);
        let seen: Vec<f32> = inputs.iter().map(|b| b[0]).collect();
        assert_eq!(seen, vec![2.0, 1.0, 2.0]);
    }
}
