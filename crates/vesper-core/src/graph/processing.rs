//! Audio graph: ownership, topology edits, scheduling and block rendering.
//!
//! [`AudioGraph`] owns every node exclusively. Callers hold [`NodeId`] handles
//! and borrow a node briefly through [`AudioGraph::node_mut`] to configure it.
//! Topology edits only flip a dirty flag; the schedule is rebuilt lazily by
//! the next [`render`](AudioGraph::render) (or eagerly through
//! [`update_process_order`](AudioGraph::update_process_order)).

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, collections::BinaryHeap, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BinaryHeap;

use core::cmp::Reverse;

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AsAny, AudioNode, Inputs};

use super::node::NodeId;

/// Directed processing graph with Kahn scheduling and sink summing.
///
/// # Edges
///
/// Both adjacency tables keep edges in insertion order and allow duplicates.
/// Connecting `a → b` twice feeds `a`'s output into `b` twice, so `b` sees
/// it summed twice. This is the permissive baseline, not an error.
///
/// # Output
///
/// The graph's signal is the sum of every sink (a node with no outgoing
/// edges). There is no designated master node.
///
/// # Cycles
///
/// A cycle leaves the cached order empty. Render then writes silence until
/// an edit removes the cycle.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, AudioGraph, Buffer, Gain, NoiseGenerator};
///
/// let ctx = AudioContext::new(64, 2, 48000.0);
/// let mut graph = AudioGraph::new(ctx);
/// let noise = graph.add_node(NoiseGenerator::new);
/// let gain = graph.add_node(|ctx| Gain::new(ctx, 0.5));
/// graph.connect(noise, gain);
///
/// let mut out = Buffer::new(&ctx);
/// graph.render(&mut out);
/// assert!(out.as_slice().iter().all(|s| s.abs() <= 0.5));
/// ```
pub struct AudioGraph {
    context: AudioContext,
    /// Slot `i` holds the node with id `i`, or `None` once removed.
    nodes: Vec<Option<Box<dyn AudioNode>>>,
    /// Per-node output buffers, indexed like `nodes`.
    outputs: Vec<Buffer>,
    /// source → destinations
    forward: Vec<Vec<NodeId>>,
    /// destination → sources
    reverse: Vec<Vec<NodeId>>,
    order: Vec<NodeId>,
    dirty: bool,
    next_node_slot: u32,
    live_count: usize,
    // Scheduler scratch, reused across rebuilds.
    in_degree: Vec<u32>,
    ready: BinaryHeap<Reverse<NodeId>>,
}

impl AudioGraph {
    /// Creates an empty graph bound to `context`.
    pub fn new(context: AudioContext) -> Self {
        Self {
            context,
            nodes: Vec::new(),
            outputs: Vec::new(),
            forward: Vec::new(),
            reverse: Vec::new(),
            order: Vec::new(),
            dirty: true,
            next_node_slot: 0,
            live_count: 0,
            in_degree: Vec::new(),
            ready: BinaryHeap::new(),
        }
    }

    /// The block shape every node in this graph renders with.
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    // --- Node ownership ---

    /// Constructs a node against the graph's context and takes ownership of it.
    ///
    /// Returns the new node's id. Use [`node_mut`](Self::node_mut) to reach
    /// the concrete node for configuration.
    pub fn add_node<T, F>(&mut self, build: F) -> NodeId
    where
        T: AudioNode,
        F: FnOnce(&AudioContext) -> T,
    {
        let node = build(&self.context);
        let id = NodeId(self.next_node_slot);
        self.next_node_slot += 1;

        self.nodes.push(Some(Box::new(node)));
        self.outputs.push(Buffer::new(&self.context));
        self.forward.push(Vec::new());
        self.reverse.push(Vec::new());
        self.live_count += 1;
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: node {id}");
        id
    }

    /// Deletes a node and every edge touching it. No-op if absent.
    pub fn remove_node(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        let idx = id.0 as usize;
        self.nodes[idx] = None;
        self.outputs[idx] = Buffer::default();
        self.forward[idx].clear();
        self.reverse[idx].clear();
        for list in self.forward.iter_mut().chain(self.reverse.iter_mut()) {
            list.retain(|&other| other != id);
        }
        self.live_count -= 1;
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
    }

    /// Returns true if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0 as usize), Some(Some(_)))
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live_count
    }

    /// Returns true if the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Borrows a node as its concrete type.
    ///
    /// Returns `None` if the id is not live or the node is a different type.
    pub fn node<T: AudioNode>(&self, id: NodeId) -> Option<&T> {
        let node = self.nodes.get(id.0 as usize)?.as_deref()?;
        AsAny::as_any(node).downcast_ref::<T>()
    }

    /// Mutably borrows a node as its concrete type for configuration.
    ///
    /// Returns `None` if the id is not live or the node is a different type.
    pub fn node_mut<T: AudioNode>(&mut self, id: NodeId) -> Option<&mut T> {
        let node = self.nodes.get_mut(id.0 as usize)?.as_deref_mut()?;
        AsAny::as_any_mut(node).downcast_mut::<T>()
    }

    /// The output a node wrote during the most recent render.
    pub fn output(&self, id: NodeId) -> Option<&Buffer> {
        if self.contains(id) {
            self.outputs.get(id.0 as usize)
        } else {
            None
        }
    }

    // --- Topology ---

    /// Adds an edge `src → dst`. No-op unless both ids are live.
    ///
    /// Duplicate edges are kept; each one sums `src` into `dst` again.
    pub fn connect(&mut self, src: NodeId, dst: NodeId) {
        if !self.contains(src) || !self.contains(dst) {
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_connect: ignored {src} → {dst}, missing node");
            return;
        }
        self.forward[src.0 as usize].push(dst);
        self.reverse[dst.0 as usize].push(src);
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {src} → {dst}");
    }

    /// Removes every `src → dst` edge. Missing edges or ids are a no-op.
    pub fn disconnect(&mut self, src: NodeId, dst: NodeId) {
        if let Some(destinations) = self.forward.get_mut(src.0 as usize) {
            destinations.retain(|&d| d != dst);
        }
        if let Some(sources) = self.reverse.get_mut(dst.0 as usize) {
            sources.retain(|&s| s != src);
        }
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {src} → {dst}");
    }

    /// Sources feeding `id`, in edge-insertion order with duplicates.
    pub fn sources_of(&self, id: NodeId) -> &[NodeId] {
        self.reverse.get(id.0 as usize).map_or(&[], Vec::as_slice)
    }

    /// Destinations fed by `id`, in edge-insertion order with duplicates.
    pub fn destinations_of(&self, id: NodeId) -> &[NodeId] {
        self.forward.get(id.0 as usize).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `id` is live and has no outgoing edges.
    pub fn is_sink(&self, id: NodeId) -> bool {
        self.contains(id) && self.forward[id.0 as usize].is_empty()
    }

    // --- Scheduling ---

    /// Returns true if the topology changed since the last schedule rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The cached execution order. Empty when a cycle was detected.
    pub fn process_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Rebuilds the execution order with Kahn's algorithm.
    ///
    /// Equally-ready nodes run in ascending id order. If the sort cannot
    /// place every node, the graph has a cycle: the order is cleared and a
    /// diagnostic is logged.
    pub fn update_process_order(&mut self) {
        self.order.clear();
        self.dirty = false;
        if self.live_count == 0 {
            return;
        }

        self.in_degree.clear();
        self.in_degree.resize(self.nodes.len(), 0);
        for (idx, destinations) in self.forward.iter().enumerate() {
            if self.nodes[idx].is_none() {
                continue;
            }
            for dst in destinations {
                self.in_degree[dst.0 as usize] += 1;
            }
        }

        self.ready.clear();
        for (idx, slot) in self.nodes.iter().enumerate() {
            if slot.is_some() && self.in_degree[idx] == 0 {
                self.ready.push(Reverse(NodeId(idx as u32)));
            }
        }

        while let Some(Reverse(id)) = self.ready.pop() {
            self.order.push(id);
            for dst in &self.forward[id.0 as usize] {
                let degree = &mut self.in_degree[dst.0 as usize];
                *degree -= 1;
                if *degree == 0 {
                    self.ready.push(Reverse(*dst));
                }
            }
        }

        if self.order.len() != self.live_count {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                scheduled = self.order.len(),
                nodes = self.live_count,
                "graph_sort: cycle detected, rendering silence"
            );
            self.order.clear();
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_sort: {} nodes in topo order", self.order.len());
    }

    // --- Rendering ---

    /// Renders one block into `output`.
    ///
    /// Rebuilds the schedule first if the topology changed. Each node
    /// receives its predecessors' fresh outputs; afterwards `output` is
    /// overwritten with the sum of all sink outputs. A cyclic graph renders
    /// silence.
    ///
    /// `output` must have the graph context's shape.
    pub fn render(&mut self, output: &mut Buffer) {
        if self.dirty {
            self.update_process_order();
        }
        if self.order.is_empty() && self.live_count > 0 {
            output.clear();
            return;
        }

        for &id in &self.order {
            let idx = id.0 as usize;
            let Some(node) = self.nodes[idx].as_deref_mut() else {
                continue;
            };
            // Lift this node's buffer out so predecessors stay readable.
            let mut node_output = core::mem::take(&mut self.outputs[idx]);
            node.process(
                Inputs::routed(&self.reverse[idx], &self.outputs),
                &mut node_output,
            );
            self.outputs[idx] = node_output;
        }

        output.clear();
        for (idx, slot) in self.nodes.iter().enumerate() {
            if slot.is_some() && self.forward[idx].is_empty() {
                output.accumulate_from(&self.outputs[idx]);
            }
        }
    }

    /// Adopts a new block shape: every node output is reshaped and every
    /// node is told about the change. Setup path only.
    pub fn set_audio_context(&mut self, context: AudioContext) {
        self.context = context;
        for (slot, output) in self.nodes.iter_mut().zip(self.outputs.iter_mut()) {
            if let Some(node) = slot {
                output.set_context(&context);
                node.set_context(&context);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            block_size = context.block_size,
            channels = context.channel_count,
            sample_rate = context.sample_rate,
            "graph_context: updated"
        );
    }

    /// Resets every node's DSP state and zeroes every node output.
    pub fn reset(&mut self) {
        for (slot, output) in self.nodes.iter_mut().zip(self.outputs.iter_mut()) {
            if let Some(node) = slot {
                node.reset();
                output.clear();
            }
        }
    }
}

impl core::fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioGraph")
            .field("context", &self.context)
            .field("nodes", &self.live_count)
            .field("order", &self.order)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
