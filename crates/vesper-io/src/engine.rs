//! Device-driven render engine.
//!
//! [`Engine`] owns an [`AudioGraph`] behind a mutex and drives it from a
//! cpal output stream. The audio callback never blocks: when the control
//! side holds the graph, that callback writes silence.

use crate::device::{device_name, find_output_device};
use crate::{BlockStream, Error, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, Stream, SupportedBufferSize};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use vesper_core::{AudioContext, AudioGraph};

/// Picks the block size the device will actually run with.
///
/// Requests outside the device's supported range are clamped into it. When
/// the range is unknown the request is kept.
pub fn negotiate_block_size(requested: usize, supported: &SupportedBufferSize) -> usize {
    match *supported {
        SupportedBufferSize::Range { min, max } if min <= max => {
            requested.clamp(min as usize, max as usize)
        }
        _ => requested,
    }
}

/// Converts a context to the stream configuration requested from cpal.
///
/// Fractional sample rates are rounded to the nearest hertz. Rates that do
/// not fit a `u32` after rounding are rejected.
pub fn stream_config(context: &AudioContext) -> Result<cpal::StreamConfig> {
    let channels = u16::try_from(context.channel_count)
        .map_err(|_| Error::UnsupportedFormat(format!("{} channels", context.channel_count)))?;
    let buffer_size = u32::try_from(context.block_size)
        .map_err(|_| Error::UnsupportedFormat(format!("block size {}", context.block_size)))?;

    let rate = f64::from(context.sample_rate).round();
    if !rate.is_finite() || rate < 1.0 || rate > f64::from(u32::MAX) {
        return Err(Error::UnsupportedFormat(format!(
            "sample rate {} Hz",
            context.sample_rate
        )));
    }

    Ok(cpal::StreamConfig {
        channels,
        sample_rate: rate as u32,
        buffer_size: cpal::BufferSize::Fixed(buffer_size),
    })
}

/// Real-time engine: one graph rendered into one output device.
///
/// ```rust,ignore
/// let mut engine = Engine::new(AudioContext::new(256, 2, 48000.0))?;
/// engine.with_graph(|graph| {
///     graph.add_node(NoiseGenerator::new);
/// });
/// engine.start()?;
/// ```
pub struct Engine {
    context: AudioContext,
    graph: Arc<Mutex<AudioGraph>>,
    output: BlockStream,
    device: Device,
    device_name: String,
    stream: Option<Stream>,
}

impl Engine {
    /// Creates an engine on the default output device.
    pub fn new(context: AudioContext) -> Result<Self> {
        Self::with_device(context, None)
    }

    /// Creates an engine on the first output device whose name contains
    /// `device`, or the default device when `None`.
    ///
    /// If the device cannot run the requested block size, the graph and
    /// output are resized to the negotiated one before anything renders.
    pub fn with_device(context: AudioContext, device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_output_device(&host, device)?;
        let device_name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());

        let mut engine = Self {
            context,
            graph: Arc::new(Mutex::new(AudioGraph::new(context))),
            output: BlockStream::new(&context),
            device,
            device_name,
            stream: None,
        };

        let supported = engine
            .device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let block_size = negotiate_block_size(context.block_size, supported.buffer_size());
        if block_size != context.block_size {
            tracing::info!(
                requested = context.block_size,
                negotiated = block_size,
                "device rejected block size, using negotiated size"
            );
            engine.set_audio_context(context.with_block_size(block_size));
        }

        tracing::info!(
            device = %engine.device_name,
            block_size = engine.context.block_size,
            channels = engine.context.channel_count,
            sample_rate = engine.context.sample_rate,
            "engine initialized"
        );
        Ok(engine)
    }

    fn set_audio_context(&mut self, context: AudioContext) {
        self.context = context;
        self.with_graph(|graph| graph.set_audio_context(context));
        self.output.set_context(&context);
    }

    /// Builds and starts the output stream.
    ///
    /// Calling `start` on a running engine is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream_config = stream_config(&self.context)?;

        let graph = Arc::clone(&self.graph);
        let mut output = std::mem::replace(&mut self.output, BlockStream::new(&self.context));

        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match graph.try_lock() {
                    Ok(mut graph) => output.fill(data, |block| graph.render(block)),
                    Err(TryLockError::Poisoned(poisoned)) => {
                        let mut graph = poisoned.into_inner();
                        output.fill(data, |block| graph.render(block));
                    }
                    Err(TryLockError::WouldBlock) => data.fill(0.0),
                },
                |err| tracing::warn!(error = %err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = stream_config.channels,
            sample_rate = stream_config.sample_rate,
            "output stream started"
        );

        self.stream = Some(stream);
        Ok(())
    }

    /// Stops and drops the output stream. The graph is kept.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!("output stream stopped");
        }
    }

    /// Runs `f` with exclusive access to the graph.
    ///
    /// While `f` runs, the audio callback outputs silence, so keep it short.
    pub fn with_graph<R>(&self, f: impl FnOnce(&mut AudioGraph) -> R) -> R {
        let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut graph)
    }

    /// The context the engine renders with, after negotiation.
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    /// Name of the output device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether the output stream is running.
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_keeps_supported_request() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(negotiate_block_size(512, &range), 512);
    }

    #[test]
    fn test_negotiate_clamps_into_range() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(negotiate_block_size(16, &range), 64);
        assert_eq!(negotiate_block_size(8192, &range), 4096);
    }

    #[test]
    fn test_negotiate_unknown_keeps_request() {
        assert_eq!(negotiate_block_size(333, &SupportedBufferSize::Unknown), 333);
    }

    fn context_at(sample_rate: f32) -> AudioContext {
        AudioContext {
            sample_rate,
            ..AudioContext::new(256, 2, 48000.0)
        }
    }

    #[test]
    fn test_stream_config_rounds_fractional_rate() {
        let config = stream_config(&context_at(44100.4)).unwrap();
        assert_eq!(config.sample_rate, 44100);
        let config = stream_config(&context_at(47999.6)).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.buffer_size, cpal::BufferSize::Fixed(256));
    }

    #[test]
    fn test_stream_config_rejects_unusable_rate() {
        for rate in [0.0, 0.4, -48000.0, f32::NAN, f32::INFINITY, 1e10] {
            let result = stream_config(&context_at(rate));
            assert!(
                matches!(result, Err(Error::UnsupportedFormat(_))),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn test_engine_without_device_is_fatal_or_usable() {
        // Device availability depends on the system.
        match Engine::new(AudioContext::new(256, 2, 48000.0)) {
            Ok(engine) => {
                assert!(!engine.is_running());
                assert!(engine.context().block_size > 0);
                assert_eq!(engine.with_graph(|g| g.node_count()), 0);
            }
            Err(err) => assert!(matches!(err, Error::NoDevice | Error::Stream(_))),
        }
    }
}
