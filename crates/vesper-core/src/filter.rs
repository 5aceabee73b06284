//! Biquad IIR filter node.
//!
//! Coefficients follow the RBJ Audio EQ Cookbook and are recomputed only
//! when the mode or parameters change, never per sample. Coefficients and
//! history are kept in `f64`; samples cross the boundary as `f32`.

use core::f64::consts::PI;
use libm::{cos, sin};

use crate::buffer::Buffer;
use crate::context::AudioContext;
use crate::node::{AudioNode, Inputs};

/// Filter response type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Passes content below the cutoff.
    #[default]
    Lowpass,
    /// Passes content above the cutoff.
    Highpass,
    /// Passes a band around the cutoff.
    Bandpass,
    /// Rejects a band around the cutoff.
    Notch,
}

/// Filter mode, cutoff in Hz and resonance (Q).
///
/// Stable for `resonance > 0` and `0 < cutoff < sample_rate / 2`. Values
/// outside that range are the caller's responsibility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterConfig {
    /// Response type.
    pub mode: FilterMode,
    /// Cutoff (or center) frequency in Hz.
    pub cutoff: f32,
    /// Q factor.
    pub resonance: f32,
}

impl FilterConfig {
    /// Creates a config.
    pub const fn new(mode: FilterMode, cutoff: f32, resonance: f32) -> Self {
        Self {
            mode,
            cutoff,
            resonance,
        }
    }
}

impl Default for FilterConfig {
    /// Lowpass at 1 kHz, Butterworth Q.
    fn default() -> Self {
        Self::new(FilterMode::Lowpass, 1000.0, 0.707)
    }
}

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Feedforward x[n].
    pub b0: f64,
    /// Feedforward x[n-1].
    pub b1: f64,
    /// Feedforward x[n-2].
    pub b2: f64,
    /// Feedback y[n-1].
    pub a1: f64,
    /// Feedback y[n-2].
    pub a2: f64,
}

impl Coefficients {
    /// Largest pole magnitude of `1 + a1 z^-1 + a2 z^-2`.
    ///
    /// The filter is stable when this is below 1.
    pub fn max_pole_magnitude(&self) -> f64 {
        let disc = self.a1 * self.a1 - 4.0 * self.a2;
        if disc < 0.0 {
            // Complex conjugate pair: |p|^2 = a2.
            libm::sqrt(self.a2)
        } else {
            let root = libm::sqrt(disc);
            let p1 = (-self.a1 + root) / 2.0;
            let p2 = (-self.a1 - root) / 2.0;
            libm::fabs(p1).max(libm::fabs(p2))
        }
    }
}

/// Calculates normalized RBJ cookbook coefficients.
///
/// # Arguments
///
/// * `mode` - Response type
/// * `cutoff` - Cutoff or center frequency in Hz
/// * `q` - Q factor (0.707 for a Butterworth lowpass/highpass)
/// * `sample_rate` - Sample rate in Hz
pub fn rbj_coefficients(mode: FilterMode, cutoff: f32, q: f32, sample_rate: f32) -> Coefficients {
    let w0 = 2.0 * PI * f64::from(cutoff) / f64::from(sample_rate);
    let alpha = sin(w0) / (2.0 * f64::from(q));
    let cos_w0 = cos(w0);

    let (b0, b1, b2) = match mode {
        FilterMode::Lowpass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
        FilterMode::Highpass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        FilterMode::Bandpass => (alpha, 0.0, -alpha),
        FilterMode::Notch => (1.0, -2.0 * cos_w0, 1.0),
    };
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;

    Coefficients {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a1: a1 / a0,
        a2: a2 / a0,
    }
}

/// Biquad filter in Direct Form I.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// The whole interleaved buffer runs through one recurrence, so history
/// carries across blocks (and across channels for multichannel buffers).
#[derive(Debug, Clone)]
pub struct Filter {
    config: FilterConfig,
    sample_rate: f32,
    coeffs: Coefficients,
    z1_x: f64,
    z2_x: f64,
    z1_y: f64,
    z2_y: f64,
}

impl Filter {
    /// Creates a filter with coefficients computed for `context`.
    pub fn new(context: &AudioContext, config: FilterConfig) -> Self {
        Self {
            config,
            sample_rate: context.sample_rate,
            coeffs: rbj_coefficients(
                config.mode,
                config.cutoff,
                config.resonance,
                context.sample_rate,
            ),
            z1_x: 0.0,
            z2_x: 0.0,
            z1_y: 0.0,
            z2_y: 0.0,
        }
    }

    /// Current mode, cutoff and resonance.
    pub fn config(&self) -> FilterConfig {
        self.config
    }

    /// Current normalized coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    /// Sets cutoff (Hz) and resonance (Q), then recomputes coefficients.
    pub fn set_params(&mut self, cutoff: f32, resonance: f32) {
        self.config.cutoff = cutoff;
        self.config.resonance = resonance;
        self.recalculate();
    }

    /// Sets the response type, then recomputes coefficients.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.config.mode = mode;
        self.recalculate();
    }

    /// Replaces mode, cutoff and resonance with one coefficient update.
    pub fn set_config(&mut self, config: FilterConfig) {
        self.config = config;
        self.recalculate();
    }

    /// Clears the input/output history. Coefficients are kept.
    pub fn clear(&mut self) {
        self.z1_x = 0.0;
        self.z2_x = 0.0;
        self.z1_y = 0.0;
        self.z2_y = 0.0;
    }

    /// Filters one sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let Coefficients { b0, b1, b2, a1, a2 } = self.coeffs;
        let x = f64::from(input);
        let y = b0 * x + b1 * self.z1_x + b2 * self.z2_x - a1 * self.z1_y - a2 * self.z2_y;

        self.z2_x = self.z1_x;
        self.z1_x = x;
        self.z2_y = self.z1_y;
        self.z1_y = y;

        y as f32
    }

    /// Filters `buffer` in place.
    pub fn apply_to_buffer(&mut self, buffer: &mut Buffer) {
        for sample in buffer.as_mut_slice() {
            *sample = self.process_sample(*sample);
        }
    }

    fn recalculate(&mut self) {
        self.coeffs = rbj_coefficients(
            self.config.mode,
            self.config.cutoff,
            self.config.resonance,
            self.sample_rate,
        );
    }
}

impl AudioNode for Filter {
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
        self.recalculate();
    }

    fn reset(&mut self) {
        self.clear();
    }
}
