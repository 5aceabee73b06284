//! Real-time audio graph and DSP nodes for the vesper engine.
//!
//! A directed graph of signal-generating and signal-shaping nodes is rendered
//! once per fixed-size block. Every node reads its predecessors' fresh output
//! and writes its own; the graph's signal is the sum of all sink nodes.
//!
//! # Modules
//!
//! - [`context`]: block shape shared by every buffer ([`AudioContext`])
//! - [`buffer`]: interleaved multichannel sample container ([`Buffer`])
//! - [`node`]: the processing contract ([`AudioNode`], [`Inputs`])
//! - [`graph`]: ownership, topology, Kahn scheduling, rendering ([`AudioGraph`])
//! - [`envelope`]: linear ADSR ([`Envelope`])
//! - [`filter`]: RBJ biquad in Direct Form I ([`Filter`])
//! - [`pitch_shift`]: dual-tap ring-buffer pitch shifter ([`PitchShift`])
//! - [`gain`]: scalar mix bus ([`Gain`])
//! - [`noise`]: white noise source ([`NoiseGenerator`])
//!
//! # Example
//!
//! ```rust
//! use vesper_core::{AudioContext, AudioGraph, Buffer, Filter, FilterConfig, Gain, NoiseGenerator};
//!
//! let ctx = AudioContext::new(128, 2, 48000.0);
//! let mut graph = AudioGraph::new(ctx);
//!
//! let noise = graph.add_node(NoiseGenerator::new);
//! let filter = graph.add_node(|ctx| Filter::new(ctx, FilterConfig::default()));
//! let bus = graph.add_node(|ctx| Gain::new(ctx, 0.5));
//! graph.connect(noise, filter);
//! graph.connect(filter, bus);
//!
//! let mut out = Buffer::new(&ctx);
//! graph.render(&mut out);
//! ```
//!
//! # Real-time contract
//!
//! [`AudioGraph::render`] and every [`AudioNode::process`] run without heap
//! allocation once the topology is settled. Topology edits and
//! [`AudioGraph::set_audio_context`] belong to the control side and must not
//! overlap a render in flight.
//!
//! # no_std Support
//!
//! Disable the default `std` feature for `no_std` + `alloc` targets. Math
//! goes through `libm`.
//!
//! # Logging
//!
//! Enable the `tracing` feature to emit `tracing` events for graph edits,
//! schedule rebuilds and cycle diagnostics.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod context;
pub mod envelope;
pub mod filter;
pub mod gain;
pub mod graph;
pub mod node;
pub mod noise;
pub mod pitch_shift;

pub use buffer::Buffer;
pub use context::AudioContext;
pub use envelope::{EnvConfig, Envelope, EnvelopeState};
pub use filter::{Coefficients, Filter, FilterConfig, FilterMode, rbj_coefficients};
pub use gain::Gain;
pub use graph::{AudioGraph, NodeId};
pub use node::{AsAny, AudioNode, Inputs, InputsIter};
pub use noise::NoiseGenerator;
pub use pitch_shift::{PitchShift, SAFETY_MARGIN, cubic_interpolate, semitones_to_ratio};
