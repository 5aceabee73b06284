//! One playback slot in a sampler's voice pool.

use vesper_core::{
    AudioContext, AudioNode, Buffer, Envelope, Filter, FilterConfig, FilterMode, PitchShift,
};

use crate::sample::SampleData;
use crate::sampler::SamplerConfig;

/// Filter state a voice starts from before a sampler pushes its own config.
pub const VOICE_FILTER_DEFAULT: FilterConfig = FilterConfig::new(FilterMode::Lowpass, 500.0, 0.5);

/// A single sampler voice: playhead, private DSP chain and scratch block.
///
/// Voices are allocated once when the owning [`Sampler`](crate::Sampler) is
/// built and are recycled from then on.
#[derive(Debug, Clone)]
pub struct SamplerVoice {
    playhead: usize,
    active: bool,
    envelope: Envelope,
    pitch: PitchShift,
    filter: Filter,
    scratch: Buffer,
}

impl SamplerVoice {
    /// Creates an idle voice with its DSP chain seeded from `config`.
    pub fn new(context: &AudioContext, config: &SamplerConfig) -> Self {
        Self {
            playhead: 0,
            active: false,
            envelope: Envelope::new(context, config.envelope.unwrap_or_default()),
            pitch: PitchShift::new(context, config.pitch_shift),
            filter: Filter::new(context, config.filter.unwrap_or(VOICE_FILTER_DEFAULT)),
            scratch: Buffer::new(context),
        }
    }

    /// Returns true while the voice is producing sound.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Next sample index to read from the source.
    pub fn playhead(&self) -> usize {
        self.playhead
    }

    /// The voice's private envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The voice's private pitch shifter.
    pub fn pitch_shifter(&self) -> &PitchShift {
        &self.pitch
    }

    /// The voice's private filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Starts playback from the top: rewinds, engages the attack and clears
    /// the pitch shifter's ring.
    pub fn trigger(&mut self) {
        self.playhead = 0;
        self.active = true;
        self.envelope.note_on();
        self.pitch.reset();
    }

    /// Moves the envelope into its release stage. The voice stays active
    /// until the envelope reaches idle.
    pub fn release(&mut self) {
        self.envelope.note_off();
    }

    /// Silences the voice immediately.
    pub fn kill(&mut self) {
        self.active = false;
        self.playhead = 0;
        self.envelope.reset();
    }

    /// Clears DSP history and stops the voice.
    pub fn reset(&mut self) {
        self.kill();
        self.pitch.reset();
        self.filter.clear();
        self.scratch.clear();
    }

    /// Reshapes the scratch block and every DSP stage for `context`.
    pub fn set_context(&mut self, context: &AudioContext) {
        self.scratch.set_context(context);
        AudioNode::set_context(&mut self.envelope, context);
        AudioNode::set_context(&mut self.pitch, context);
        AudioNode::set_context(&mut self.filter, context);
    }

    /// Renders one block of `sample` through the configured chain and sums
    /// it into `output`.
    ///
    /// Reaching the end of a non-looping sample deactivates the voice and
    /// leaves the rest of the block silent. An empty sample ends at once,
    /// looping or not. With an envelope configured, the voice also ends
    /// when the envelope returns to idle.
    pub fn render(&mut self, sample: &SampleData, config: &SamplerConfig, output: &mut Buffer) {
        if !self.active {
            return;
        }

        self.scratch.clear();
        let source = sample.as_slice();
        for slot in self.scratch.as_mut_slice() {
            if self.playhead >= source.len() {
                if config.looping && !source.is_empty() {
                    self.playhead = 0;
                    if config.envelope.is_some() {
                        self.envelope.note_on();
                    }
                } else {
                    if config.envelope.is_some() {
                        self.envelope.reset();
                    }
                    self.active = false;
                    self.playhead = 0;
                    break;
                }
            }
            *slot = source[self.playhead] * config.gain;
            self.playhead += 1;
        }

        if config.pitch_shift != 0 {
            self.pitch.set_pitch(config.pitch_shift);
            self.pitch.apply_to_buffer(&mut self.scratch);
        }

        if let Some(env) = config.envelope {
            self.envelope.set_config(env);
            self.envelope.apply_to_buffer(&mut self.scratch);
            if !self.envelope.is_active() {
                self.active = false;
            }
        }

        if let Some(filter) = config.filter {
            self.filter.set_config(filter);
            self.filter.apply_to_buffer(&mut self.scratch);
        }

        output.accumulate_from(&self.scratch);
    }
}
