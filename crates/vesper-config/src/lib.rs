//! Manifest loading for vesper sample packs.
//!
//! A manifest is one TOML file describing the render shape the engine should
//! request, the samples a [`SamplePack`](vesper_sampler::SamplePack) is built
//! from, and the cues a
//! [`MusicCueOrchestrator`](vesper_sampler::MusicCueOrchestrator) plays.
//!
//! # Example
//!
//! ```rust,no_run
//! use vesper_config::PackManifest;
//!
//! let manifest = PackManifest::load("packs/drums.toml").unwrap();
//! let ctx = manifest.engine.context();
//! let items = manifest.pack_items();
//! println!("{} samples at {} Hz", items.len(), ctx.sample_rate);
//! ```

mod error;
mod manifest;

pub use error::ConfigError;
pub use manifest::{
    CueEntry, EngineConfig, EnvelopeEntry, FilterEntry, FilterKind, PackManifest, SampleEntry,
};
