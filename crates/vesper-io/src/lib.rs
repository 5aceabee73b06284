//! Audio I/O layer for the vesper engine.
//!
//! This crate provides the collaborators the render core relies on:
//!
//! - **Sample decoding**: [`decode_wav`] and [`WavLoader`] turn WAV assets
//!   into [`SampleData`](vesper_sampler::SampleData) shaped for the engine
//! - **Device output**: [`Engine`] drives an [`AudioGraph`](vesper_core::AudioGraph)
//!   from a cpal output stream
//! - **Device discovery**: [`list_devices`] and [`default_output_device`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vesper_core::{AudioContext, Gain, NoiseGenerator};
//! use vesper_io::Engine;
//!
//! let mut engine = Engine::new(AudioContext::new(512, 2, 44100.0))?;
//! engine.with_graph(|graph| {
//!     let noise = graph.add_node(NoiseGenerator::new);
//!     let gain = graph.add_node(|ctx| Gain::new(ctx, 0.5));
//!     graph.connect(noise, gain);
//! });
//! engine.start()?;
//! ```

mod block;
mod device;
mod engine;
mod wav;

pub use block::BlockStream;
pub use device::{OutputDevice, default_output_device, list_devices};
pub use engine::{Engine, negotiate_block_size, stream_config};
pub use wav::{WavLoader, WavSpec, decode_wav, remap_channels, resample_linear, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No output device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested output device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The requested stream or file format is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
