//! Polyphonic sample-playback node.
//!
//! A [`Sampler`] owns one decoded sample and a fixed pool of
//! [`SamplerVoice`]s sized to its polyphony. Allocation takes the first idle
//! voice in pool order; when every voice is busy the oldest-triggered voice
//! is stolen. A FIFO of voice indices, preallocated to the pool size, tracks
//! trigger order, so neither triggering nor rendering allocates.

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use vesper_core::{AudioContext, AudioNode, Buffer, EnvConfig, FilterConfig, Inputs};

use crate::sample::SampleData;
use crate::voice::SamplerVoice;

/// Playback settings shared by every voice of a [`Sampler`].
///
/// Envelope and filter are optional stages: `None` skips the stage
/// entirely. A pitch shift of 0 semitones also skips its stage.
///
/// # Example
///
/// ```rust
/// use vesper_core::{EnvConfig, FilterConfig, FilterMode};
/// use vesper_sampler::SamplerConfig;
///
/// let config = SamplerConfig::default()
///     .with_polyphony(4)
///     .with_gain(0.8)
///     .with_envelope(EnvConfig::new(0.005, 0.1, 0.6, 0.3))
///     .with_filter(FilterConfig::new(FilterMode::Lowpass, 2000.0, 0.707));
/// assert_eq!(config.polyphony, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Voice pool size. Clamped to at least 1 by [`Sampler::new`].
    pub polyphony: usize,
    /// Restart from the top when the sample ends.
    pub looping: bool,
    /// Linear gain applied while copying sample material.
    pub gain: f32,
    /// Pitch offset in semitones.
    pub pitch_shift: i32,
    /// Per-voice amplitude envelope.
    pub envelope: Option<EnvConfig>,
    /// Per-voice filter.
    pub filter: Option<FilterConfig>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            polyphony: 1,
            looping: false,
            gain: 1.0,
            pitch_shift: 0,
            envelope: None,
            filter: None,
        }
    }
}

impl SamplerConfig {
    /// Sets the voice pool size.
    pub fn with_polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = polyphony;
        self
    }

    /// Sets looping playback.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sets the playback gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Sets the pitch offset in semitones.
    pub fn with_pitch_shift(mut self, semitones: i32) -> Self {
        self.pitch_shift = semitones;
        self
    }

    /// Enables the envelope stage.
    pub fn with_envelope(mut self, envelope: EnvConfig) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Enables the filter stage.
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Polyphonic sampler node. Ignores its graph inputs.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, AudioGraph, Buffer};
/// use vesper_sampler::{SampleData, Sampler, SamplerConfig};
///
/// let ctx = AudioContext::new(4, 1, 48000.0);
/// let mut graph = AudioGraph::new(ctx);
/// let sample = SampleData::from_interleaved(vec![0.5, -0.5, 0.25, -0.25], 1);
/// let id = graph.add_node(|ctx| Sampler::new(ctx, sample, SamplerConfig::default().with_gain(2.0)));
///
/// graph.node_mut::<Sampler>(id).unwrap().note_on();
/// let mut out = Buffer::new(&ctx);
/// graph.render(&mut out);
/// assert_eq!(out.as_slice(), &[1.0, -1.0, 0.5, -0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    sample: SampleData,
    config: SamplerConfig,
    voices: Vec<SamplerVoice>,
    /// Indices of active voices, oldest trigger first.
    active: VecDeque<usize>,
}

impl Sampler {
    /// Builds a sampler with its full voice pool.
    pub fn new(context: &AudioContext, sample: SampleData, config: SamplerConfig) -> Self {
        let mut config = config;
        config.polyphony = config.polyphony.max(1);

        let voices = (0..config.polyphony)
            .map(|_| SamplerVoice::new(context, &config))
            .collect();

        Self {
            sample,
            config,
            voices,
            active: VecDeque::with_capacity(config.polyphony),
        }
    }

    /// Starts a new note and returns the index of the voice that plays it.
    pub fn note_on(&mut self) -> usize {
        let idx = self.allocate_voice();
        self.voices[idx].trigger();
        self.active.push_back(idx);
        idx
    }

    /// Releases every active voice.
    ///
    /// With an envelope configured the voices fade through their release
    /// stage; without one there is nothing to fade and they stop at once.
    pub fn note_off(&mut self) {
        let has_envelope = self.config.envelope.is_some();
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            if has_envelope {
                voice.release();
            } else {
                voice.kill();
            }
        }
        self.active.retain(|&i| self.voices[i].is_active());
    }

    /// Stops every voice immediately.
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        self.active.clear();
    }

    /// Number of voices currently sounding.
    pub fn active_voice_count(&self) -> usize {
        self.active.len()
    }

    /// Voice pool size.
    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    /// A voice from the pool.
    pub fn voice(&self, index: usize) -> Option<&SamplerVoice> {
        self.voices.get(index)
    }

    /// The whole voice pool.
    pub fn voices(&self) -> &[SamplerVoice] {
        &self.voices
    }

    /// The sample being played.
    pub fn sample(&self) -> &SampleData {
        &self.sample
    }

    /// Current playback settings.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sets the playback gain.
    pub fn set_gain(&mut self, gain: f32) {
        self.config.gain = gain;
    }

    /// Enables or disables looping.
    pub fn set_looping(&mut self, looping: bool) {
        self.config.looping = looping;
    }

    /// Sets the pitch offset in semitones; 0 bypasses the shifter.
    pub fn set_pitch_shift(&mut self, semitones: i32) {
        self.config.pitch_shift = semitones;
    }

    /// Sets or removes the per-voice filter.
    pub fn set_filter(&mut self, filter: Option<FilterConfig>) {
        self.config.filter = filter;
    }

    /// Sets or removes the per-voice envelope.
    pub fn set_envelope(&mut self, envelope: Option<EnvConfig>) {
        self.config.envelope = envelope;
    }

    fn allocate_voice(&mut self) -> usize {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            return idx;
        }

        let idx = self.active.pop_front().unwrap_or(0);
        #[cfg(feature = "tracing")]
        tracing::debug!(voice = idx, "sampler: stealing oldest voice");
        idx
    }
}

impl AudioNode for Sampler {
    fn process(&mut self, _inputs: Inputs<'_>, output: &mut Buffer) {
        output.clear();

        for (idx, voice) in self.voices.iter_mut().enumerate() {
            if !voice.is_active() {
                continue;
            }
            voice.render(&self.sample, &self.config, output);
            if !voice.is_active() {
                self.active.retain(|&i| i != idx);
            }
        }
    }

    fn set_context(&mut self, context: &AudioContext) {
        for voice in &mut self.voices {
            voice.set_context(context);
        }
    }

    fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.active.clear();
    }
}
