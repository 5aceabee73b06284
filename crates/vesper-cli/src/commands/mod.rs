//! CLI command implementations.

pub mod devices;
pub mod noise;
pub mod play;

use clap::Args;
use vesper_core::AudioContext;

/// Render-shape flags shared by every command that opens a device.
#[derive(Args, Debug, Default, Clone)]
pub struct EngineOverrides {
    /// Frames per block (the device may negotiate a different size)
    #[arg(long, global = true)]
    pub block_size: Option<usize>,

    /// Output channel count
    #[arg(long, global = true)]
    pub channels: Option<usize>,

    /// Sample rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Output device (partial name match)
    #[arg(long, global = true)]
    pub device: Option<String>,
}

impl EngineOverrides {
    /// Applies any flags that were given on top of `base`.
    pub fn apply(&self, base: AudioContext) -> anyhow::Result<AudioContext> {
        let ctx = AudioContext::new(
            self.block_size.unwrap_or(base.block_size),
            self.channels.unwrap_or(base.channel_count),
            self.sample_rate.map_or(base.sample_rate, |sr| sr as f32),
        );
        anyhow::ensure!(ctx.block_size > 0, "--block-size must be > 0");
        anyhow::ensure!(ctx.channel_count > 0, "--channels must be > 0");
        anyhow::ensure!(ctx.sample_rate > 0.0, "--sample-rate must be > 0");
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_base() {
        let base = AudioContext::new(128, 1, 22050.0);
        assert_eq!(EngineOverrides::default().apply(base).unwrap(), base);
    }

    #[test]
    fn test_flags_override_fields() {
        let overrides = EngineOverrides {
            block_size: Some(64),
            sample_rate: Some(96000),
            ..EngineOverrides::default()
        };
        let ctx = overrides.apply(AudioContext::default()).unwrap();
        assert_eq!(ctx, AudioContext::new(64, 2, 96000.0));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let overrides = EngineOverrides {
            channels: Some(0),
            ..EngineOverrides::default()
        };
        assert!(overrides.apply(AudioContext::default()).is_err());
    }
}
