//! Linear ADSR envelope.
//!
//! One call to [`Envelope::next_level`] advances the state machine by exactly
//! one sample. Segments are linear:
//!
//! | State   | Per-sample step                         | Exit                      |
//! |---------|-----------------------------------------|---------------------------|
//! | Attack  | `+1 / (attack * sr)`                    | level ≥ 1 → Decay         |
//! | Decay   | `-(1 - sustain) / (decay * sr)`         | level ≤ sustain → Sustain |
//! | Sustain | hold                                    | see below                 |
//! | Release | `-sustain / (release * sr)`             | level ≤ 0 → Idle          |
//!
//! The sustain stage is currently skipped: an envelope that reaches Sustain
//! moves to Release on the following sample, so every note plays as a
//! one-shot. The sustain level still shapes the decay target and release
//! slope.
// FIXME: skip_sustain is hard-wired, which makes note_off redundant for
// envelopes that have finished decaying. Expose it once held notes exist.

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AudioNode, Inputs};

/// ADSR envelope states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Inactive, level 0.
    #[default]
    Idle,
    /// Ramping up toward 1.0.
    Attack,
    /// Falling from 1.0 toward the sustain level.
    Decay,
    /// Holding at the sustain level.
    Sustain,
    /// Falling toward 0.
    Release,
}

/// Envelope timing in seconds plus sustain level in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvConfig {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl EnvConfig {
    /// Creates a config from ADSR components.
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for EnvConfig {
    /// 10 ms attack, 100 ms decay, 0.8 sustain, 200 ms release.
    fn default() -> Self {
        Self::new(0.01, 0.1, 0.8, 0.2)
    }
}

/// Linear ADSR envelope, usable as a graph node or applied in place.
///
/// # Example
///
/// ```rust
/// use vesper_core::{AudioContext, EnvConfig, Envelope, EnvelopeState};
///
/// let ctx = AudioContext::new(64, 1, 8.0);
/// let mut env = Envelope::new(&ctx, EnvConfig::new(0.5, 0.5, 0.5, 0.5));
/// env.note_on();
/// for _ in 0..4 {
///     env.next_level();
/// }
/// assert_eq!(env.level(), 1.0);
/// assert_eq!(env.state(), EnvelopeState::Decay);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    config: EnvConfig,
    sample_rate: f32,
    state: EnvelopeState,
    level: f32,
    skip_sustain: bool,
}

impl Envelope {
    /// Creates an idle envelope.
    pub fn new(context: &AudioContext, config: EnvConfig) -> Self {
        Self {
            config,
            sample_rate: context.sample_rate,
            state: EnvelopeState::Idle,
            level: 0.0,
            skip_sustain: true,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> EnvConfig {
        self.config
    }

    /// Replaces the configuration. Takes effect on the next sample.
    pub fn set_config(&mut self, config: EnvConfig) {
        self.config = config;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Level produced by the most recent [`next_level`](Self::next_level).
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Returns true unless the envelope is idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Starts the attack from zero, cutting off any segment in progress.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.level = 0.0;
    }

    /// Enters release from the current level.
    pub fn note_off(&mut self) {
        self.state = EnvelopeState::Release;
    }

    /// Forces idle at level 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Advances one sample and returns the new level.
    pub fn next_level(&mut self) -> f32 {
        let EnvConfig {
            attack,
            decay,
            sustain,
            release,
        } = self.config;
        let sr = self.sample_rate;

        match self.state {
            EnvelopeState::Idle => {}
            EnvelopeState::Attack => {
                self.level += 1.0 / (attack * sr);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.level -= (1.0 - sustain) / (decay * sr);
                if self.level <= sustain {
                    self.level = sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                if self.skip_sustain {
                    self.state = EnvelopeState::Release;
                }
            }
            EnvelopeState::Release => {
                self.level -= sustain / (release * sr);
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }
        self.level
    }

    /// Multiplies every sample of `buffer` by one new level each.
    pub fn apply_to_buffer(&mut self, buffer: &mut Buffer) {
        for sample in buffer.as_mut_slice() {
            *sample *= self.next_level();
        }
    }
}

impl AudioNode for Envelope {
    fn process(&mut self, inputs: Inputs<'_>, output: &mut Buffer) {
        if inputs.is_empty() {
            return;
        }
        output.clear();
        inputs.sum_into(output);
        self.apply_to_buffer(output);
    }

    fn set_context(&mut self, context: &AudioContext) {
        self.sample_rate = context.sample_rate;
    }

    fn reset(&mut self) {
        Envelope::reset(self);
    }
}
