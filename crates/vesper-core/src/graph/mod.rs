//! Processing graph for the vesper engine.
//!
//! The graph owns every node, keeps the connection topology, schedules
//! nodes in topological order and renders one block per call.
//!
//! # Architecture
//!
//! Nodes live in an id-indexed arena owned by [`AudioGraph`]. External code
//! holds [`NodeId`] handles and borrows a node only for the duration of a
//! configuration call. Two adjacency tables (source → destinations and
//! destination → sources) are edited in lockstep and keep edge insertion
//! order, duplicates included.
//!
//! # Scheduling
//!
//! Edits set a dirty flag. The next render rebuilds the order with Kahn's
//! algorithm, breaking ties by ascending id so that renders are
//! reproducible. If a cycle prevents a full order, the order is left empty
//! and render substitutes silence.
//!
//! # Rendering
//!
//! ```text
//!   for id in order:
//!       inputs = outputs[sources(id)]      (edge order, duplicates kept)
//!       node(id).process(inputs, outputs[id])
//!   out = Σ outputs[sink]                  (every node with no outgoing edge)
//! ```
//!
//! Nodes never run concurrently: per-node state is unsynchronized and each
//! node needs its predecessors' fresh output.

pub mod node;
mod processing;

pub use node::NodeId;
pub use processing::AudioGraph;
