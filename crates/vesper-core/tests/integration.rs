//! Integration tests for vesper-core: nodes wired through the graph.
//!
//! Verifies that each DSP node behaves the same inside the graph as it does
//! standalone, that state persists across renders, and that context changes
//! reach every node.

use vesper_core::{
    AudioContext, AudioGraph, AudioNode, Buffer, EnvConfig, Envelope, EnvelopeState, Filter,
    FilterConfig, FilterMode, Gain, Inputs, NoiseGenerator, PitchShift,
};

const SR: f32 = 48000.0;

/// Emits a unit impulse on the very first sample it ever renders.
#[derive(Default)]
struct Impulse {
    fired: bool,
}

impl AudioNode for Impulse {
    fn process(&mut self, _inputs: Inputs<'_>, output: &mut Buffer) {
        output.clear();
        if !self.fired {
            output[0] = 1.0;
            self.fired = true;
        }
    }
}

/// Emits a constant value.
struct Dc(f32);

impl AudioNode for Dc {
    fn process(&mut self, _inputs: Inputs<'_>, output: &mut Buffer) {
        output.as_mut_slice().fill(self.0);
    }
}

#[test]
fn filter_state_persists_across_renders() {
    let ctx = AudioContext::new(32, 1, SR);
    let config = FilterConfig::new(FilterMode::Lowpass, 1000.0, 0.707);

    let mut graph = AudioGraph::new(ctx);
    let src = graph.add_node(|_| Impulse::default());
    let filter = graph.add_node(|ctx| Filter::new(ctx, config));
    graph.connect(src, filter);

    let mut rendered = Vec::new();
    let mut out = Buffer::new(&ctx);
    for _ in 0..4 {
        graph.render(&mut out);
        rendered.extend_from_slice(out.as_slice());
    }

    let mut reference = Filter::new(&AudioContext::new(128, 1, SR), config);
    let mut impulse = vec![0.0; 128];
    impulse[0] = 1.0;
    let mut expected = Buffer::from_interleaved(impulse, 1, SR);
    reference.apply_to_buffer(&mut expected);

    assert_eq!(rendered.as_slice(), expected.as_slice());
}

#[test]
fn envelope_node_shapes_graph_signal() {
    let ctx = AudioContext::new(4, 1, 8.0);
    let mut graph = AudioGraph::new(ctx);
    let dc = graph.add_node(|_| Dc(1.0));
    let env = graph.add_node(|ctx| Envelope::new(ctx, EnvConfig::new(0.5, 0.5, 0.5, 0.5)));
    graph.connect(dc, env);
    graph.node_mut::<Envelope>(env).unwrap().note_on();

    let mut out = Buffer::new(&ctx);
    graph.render(&mut out);
    assert_eq!(out.as_slice(), &[0.25, 0.5, 0.75, 1.0]);
    graph.render(&mut out);
    assert_eq!(out.as_slice(), &[0.875, 0.75, 0.625, 0.5]);
    assert_eq!(
        graph.node::<Envelope>(env).unwrap().state(),
        EnvelopeState::Sustain
    );
}

#[test]
fn noise_through_gain_is_scaled() {
    let ctx = AudioContext::new(256, 2, SR);
    let mut graph = AudioGraph::new(ctx);
    let noise = graph.add_node(NoiseGenerator::new);
    let half = graph.add_node(|ctx| Gain::new(ctx, 0.5));
    let bus = graph.add_node(|ctx| Gain::new(ctx, 1.0));
    graph.connect(noise, half);
    graph.connect(half, bus);

    let mut out = Buffer::new(&ctx);
    graph.render(&mut out);
    let raw = graph.output(noise).unwrap().clone();
    for (o, r) in out.as_slice().iter().zip(raw.as_slice()) {
        assert_eq!(*o, r * 0.5);
    }
}

#[test]
fn context_change_reaches_pitch_shift_ring() {
    let ctx = AudioContext::new(64, 1, SR);
    let mut graph = AudioGraph::new(ctx);
    let src = graph.add_node(|_| Dc(0.5));
    let shift = graph.add_node(|ctx| PitchShift::new(ctx, 3));
    graph.connect(src, shift);

    let wider = AudioContext::new(128, 2, SR);
    graph.set_audio_context(wider);
    assert_eq!(graph.node::<PitchShift>(shift).unwrap().ring_len(), 256);

    let mut out = Buffer::new(&wider);
    for _ in 0..4 {
        graph.render(&mut out);
    }
    assert!(out.as_slice().iter().all(|s| s.is_finite()));
}

#[test]
fn reset_silences_stateful_nodes() {
    let ctx = AudioContext::new(16, 1, SR);
    let mut graph = AudioGraph::new(ctx);
    let src = graph.add_node(|_| Dc(1.0));
    let shift = graph.add_node(|ctx| PitchShift::new(ctx, 0));
    graph.connect(src, shift);

    let mut out = Buffer::new(&ctx);
    graph.render(&mut out);
    graph.reset();
    graph.remove_node(src);
    graph.render(&mut out);
    assert!(out.as_slice().iter().all(|&s| s == 0.0));
}
