//! Sample pack manifest format.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vesper_core::{AudioContext, EnvConfig, FilterConfig, FilterMode};
use vesper_sampler::{MusicCue, SamplePackItem};

use crate::error::ConfigError;

/// Render shape requested from the device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames per block.
    pub block_size: usize,
    /// Interleaved output channels.
    pub channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let ctx = AudioContext::default();
        Self {
            block_size: ctx.block_size,
            channels: ctx.channel_count,
            sample_rate: ctx.sample_rate as u32,
        }
    }
}

impl EngineConfig {
    /// The audio context this section describes.
    pub fn context(&self) -> AudioContext {
        AudioContext::new(self.block_size, self.channels, self.sample_rate as f32)
    }
}

/// ADSR settings for a sample's voices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeEntry {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for EnvelopeEntry {
    fn default() -> Self {
        EnvConfig::default().into()
    }
}

impl From<EnvConfig> for EnvelopeEntry {
    fn from(c: EnvConfig) -> Self {
        Self {
            attack: c.attack,
            decay: c.decay,
            sustain: c.sustain,
            release: c.release,
        }
    }
}

impl From<EnvelopeEntry> for EnvConfig {
    fn from(e: EnvelopeEntry) -> Self {
        EnvConfig::new(e.attack, e.decay, e.sustain, e.release)
    }
}

/// Filter response names as written in manifests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// See [`FilterMode::Lowpass`].
    #[default]
    Lowpass,
    /// See [`FilterMode::Highpass`].
    Highpass,
    /// See [`FilterMode::Bandpass`].
    Bandpass,
    /// See [`FilterMode::Notch`].
    Notch,
}

impl From<FilterKind> for FilterMode {
    fn from(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Lowpass => FilterMode::Lowpass,
            FilterKind::Highpass => FilterMode::Highpass,
            FilterKind::Bandpass => FilterMode::Bandpass,
            FilterKind::Notch => FilterMode::Notch,
        }
    }
}

impl From<FilterMode> for FilterKind {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Lowpass => FilterKind::Lowpass,
            FilterMode::Highpass => FilterKind::Highpass,
            FilterMode::Bandpass => FilterKind::Bandpass,
            FilterMode::Notch => FilterKind::Notch,
        }
    }
}

/// Biquad settings for a sample's voices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterEntry {
    /// Response type.
    pub mode: FilterKind,
    /// Cutoff frequency in Hz.
    pub cutoff: f32,
    /// Q factor.
    pub resonance: f32,
}

impl Default for FilterEntry {
    fn default() -> Self {
        FilterConfig::default().into()
    }
}

impl From<FilterConfig> for FilterEntry {
    fn from(c: FilterConfig) -> Self {
        Self {
            mode: c.mode.into(),
            cutoff: c.cutoff,
            resonance: c.resonance,
        }
    }
}

impl From<FilterEntry> for FilterConfig {
    fn from(e: FilterEntry) -> Self {
        FilterConfig::new(e.mode.into(), e.cutoff, e.resonance)
    }
}

fn default_gain() -> f32 {
    1.0
}

fn default_polyphony() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// One triggerable sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleEntry {
    /// Name used to trigger the sample.
    pub slug: String,
    /// File name relative to the pack's samples directory.
    pub file: String,
    /// Voice pool size.
    #[serde(default = "default_polyphony")]
    pub polyphony: usize,
    /// Restart from the top when the sample ends.
    #[serde(default)]
    pub looping: bool,
    /// Playback gain.
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// Pitch offset in semitones.
    #[serde(default)]
    pub pitch_shift: i32,
    /// Optional per-voice envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeEntry>,
    /// Optional per-voice filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterEntry>,
}

impl SampleEntry {
    /// Creates an entry with default playback settings.
    pub fn new(slug: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            file: file.into(),
            polyphony: 1,
            looping: false,
            gain: 1.0,
            pitch_shift: 0,
            envelope: None,
            filter: None,
        }
    }

    /// Converts to the item a [`SamplePack`](vesper_sampler::SamplePack) is built from.
    pub fn to_item(&self) -> SamplePackItem {
        SamplePackItem {
            polyphony: self.polyphony,
            looping: self.looping,
            gain: self.gain,
            pitch_shift: self.pitch_shift,
            envelope: self.envelope.map(Into::into),
            filter: self.filter.map(Into::into),
            ..SamplePackItem::new(self.slug.as_str(), self.file.as_str())
        }
    }
}

/// One music cue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CueEntry {
    /// Name used to start the cue.
    pub slug: String,
    /// File name relative to the pack's samples directory.
    pub file: String,
    /// Restart from the top when the track ends.
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Playback gain.
    #[serde(default = "default_gain")]
    pub gain: f32,
}

impl CueEntry {
    /// Converts to a [`MusicCue`].
    pub fn to_cue(&self) -> MusicCue {
        MusicCue {
            looping: self.looping,
            gain: self.gain,
            ..MusicCue::new(self.slug.as_str(), self.file.as_str())
        }
    }
}

/// A sample pack manifest: engine shape, triggerable samples and music cues.
///
/// # TOML Format
///
/// ```toml
/// samples_dir = "assets"
/// gain = 0.8
///
/// [engine]
/// block_size = 256
/// channels = 2
/// sample_rate = 48000
///
/// [[samples]]
/// slug = "kick"
/// file = "kick.wav"
/// polyphony = 4
///
/// [[samples]]
/// slug = "pad"
/// file = "pad.wav"
/// looping = true
/// pitch_shift = -12
/// [samples.envelope]
/// attack = 0.5
/// release = 1.0
/// [samples.filter]
/// mode = "lowpass"
/// cutoff = 800.0
///
/// [[cues]]
/// slug = "theme"
/// file = "theme.wav"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackManifest {
    /// Directory sample files are resolved against. Relative paths are
    /// relative to the manifest file.
    #[serde(default = "default_samples_dir")]
    pub samples_dir: PathBuf,
    /// Gain of the pack's output bus.
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// Requested render shape.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Triggerable samples.
    #[serde(default)]
    pub samples: Vec<SampleEntry>,
    /// Music cues.
    #[serde(default)]
    pub cues: Vec<CueEntry>,
}

fn default_samples_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PackManifest {
    fn default() -> Self {
        Self {
            samples_dir: default_samples_dir(),
            gain: 1.0,
            engine: EngineConfig::default(),
            samples: Vec::new(),
            cues: Vec::new(),
        }
    }
}

impl PackManifest {
    /// Load and validate a manifest from a TOML file.
    ///
    /// A relative `samples_dir` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut manifest = Self::from_toml(&content)?;
        if manifest.samples_dir.is_relative()
            && let Some(parent) = path.parent()
        {
            manifest.samples_dir = parent.join(&manifest.samples_dir);
        }
        Ok(manifest)
    }

    /// Parse and validate a manifest from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let manifest: PackManifest = toml::from_str(toml_str)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Save the manifest to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the manifest to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if engine.block_size == 0 {
            return Err(ConfigError::invalid("engine.block_size must be > 0"));
        }
        if engine.channels == 0 {
            return Err(ConfigError::invalid("engine.channels must be > 0"));
        }
        if engine.sample_rate == 0 {
            return Err(ConfigError::invalid("engine.sample_rate must be > 0"));
        }
        let nyquist = engine.sample_rate as f32 / 2.0;

        let mut seen = HashSet::new();
        for sample in &self.samples {
            if !seen.insert(sample.slug.as_str()) {
                return Err(ConfigError::DuplicateSlug(sample.slug.clone()));
            }
            if sample.polyphony == 0 {
                return Err(ConfigError::invalid(format!(
                    "sample '{}': polyphony must be >= 1",
                    sample.slug
                )));
            }
            if let Some(filter) = &sample.filter {
                if !(filter.cutoff > 0.0 && filter.cutoff < nyquist) {
                    return Err(ConfigError::invalid(format!(
                        "sample '{}': filter cutoff {} outside (0, {})",
                        sample.slug, filter.cutoff, nyquist
                    )));
                }
                if filter.resonance <= 0.0 {
                    return Err(ConfigError::invalid(format!(
                        "sample '{}': filter resonance must be > 0",
                        sample.slug
                    )));
                }
            }
            if let Some(env) = &sample.envelope {
                // Decay and release divide by their time.
                if env.attack < 0.0 || env.decay <= 0.0 || env.release <= 0.0 {
                    return Err(ConfigError::invalid(format!(
                        "sample '{}': envelope attack must be >= 0, decay and release > 0",
                        sample.slug
                    )));
                }
                if !(0.0..=1.0).contains(&env.sustain) {
                    return Err(ConfigError::invalid(format!(
                        "sample '{}': envelope sustain {} outside [0, 1]",
                        sample.slug, env.sustain
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        for cue in &self.cues {
            if !seen.insert(cue.slug.as_str()) {
                return Err(ConfigError::DuplicateSlug(cue.slug.clone()));
            }
        }
        Ok(())
    }

    /// Items for [`SamplePack::new`](vesper_sampler::SamplePack::new).
    pub fn pack_items(&self) -> Vec<SamplePackItem> {
        self.samples.iter().map(SampleEntry::to_item).collect()
    }

    /// Cues for [`MusicCueOrchestrator::new`](vesper_sampler::MusicCueOrchestrator::new).
    pub fn music_cues(&self) -> Vec<MusicCue> {
        self.cues.iter().map(CueEntry::to_cue).collect()
    }
}
