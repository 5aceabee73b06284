//! Polyphonic sample playback for the vesper audio graph.
//!
//! # Components
//!
//! - [`Sampler`]: graph node owning a decoded sample and a fixed voice pool
//!   with oldest-first stealing
//! - [`SamplerVoice`]: one playback slot with its own envelope, pitch
//!   shifter and filter
//! - [`SamplePack`]: named one-shot samplers summed into a shared bus
//! - [`MusicCueOrchestrator`]: single-track music playback with cue switching
//! - [`SampleLoader`]: decode seam; see `vesper-io` for the WAV loader
//!
//! ```rust
//! use vesper_core::{AudioContext, AudioGraph, Buffer};
//! use vesper_sampler::{SampleData, Sampler, SamplerConfig};
//!
//! let ctx = AudioContext::new(64, 2, 48000.0);
//! let mut graph = AudioGraph::new(ctx);
//! let hit = SampleData::from_interleaved(vec![0.25; 256], 2);
//! let id = graph.add_node(|ctx| Sampler::new(ctx, hit, SamplerConfig::default().with_polyphony(4)));
//!
//! graph.node_mut::<Sampler>(id).unwrap().note_on();
//! let mut out = Buffer::new(&ctx);
//! graph.render(&mut out);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature for `no_std` + `alloc` targets.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod cue;
pub mod pack;
pub mod sample;
pub mod sampler;
pub mod voice;

pub use cue::{MusicCue, MusicCueOrchestrator};
pub use pack::{SamplePack, SamplePackItem};
pub use sample::{SampleData, SampleLoader};
pub use sampler::{Sampler, SamplerConfig};
pub use voice::{SamplerVoice, VOICE_FILTER_DEFAULT};
