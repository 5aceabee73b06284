//! Property-based tests for sampler voice allocation.

use proptest::prelude::*;
use vesper_core::{AudioContext, AudioNode, Buffer, Inputs};
use vesper_sampler::{SampleData, Sampler, SamplerConfig};

#[derive(Debug, Clone)]
enum Op {
    NoteOn,
    NoteOff,
    StopAll,
    Render,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::NoteOn),
        1 => Just(Op::NoteOff),
        1 => Just(Op::StopAll),
        4 => Just(Op::Render),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever the sequence of control calls and renders, the tracked count
    /// matches the voices that are actually sounding and never exceeds the
    /// pool.
    #[test]
    fn active_tracking_matches_pool(
        polyphony in 1usize..8,
        sample_len in 0usize..64,
        looping in any::<bool>(),
        ops in prop::collection::vec(op(), 1..64),
    ) {
        let ctx = AudioContext::new(8, 1, 48000.0);
        let sample = SampleData::from_interleaved(vec![0.5; sample_len], 1);
        let config = SamplerConfig::default().with_polyphony(polyphony).with_looping(looping);
        let mut sampler = Sampler::new(&ctx, sample, config);
        let mut out = Buffer::new(&ctx);

        for op in ops {
            match op {
                Op::NoteOn => {
                    let idx = sampler.note_on();
                    prop_assert!(idx < polyphony);
                    prop_assert!(sampler.voice(idx).unwrap().is_active());
                }
                Op::NoteOff => sampler.note_off(),
                Op::StopAll => sampler.stop_all(),
                Op::Render => sampler.process(Inputs::none(), &mut out),
            }
            let sounding = sampler.voices().iter().filter(|v| v.is_active()).count();
            prop_assert_eq!(sampler.active_voice_count(), sounding);
            prop_assert!(sounding <= polyphony);
        }
    }

    /// Every rendered sample is a sum of at most `polyphony` voices.
    #[test]
    fn output_bounded_by_polyphony(
        polyphony in 1usize..6,
        triggers in 1usize..12,
        level in -1.0f32..1.0,
    ) {
        let ctx = AudioContext::new(16, 2, 48000.0);
        let sample = SampleData::from_interleaved(vec![level; 256], 2);
        let mut sampler = Sampler::new(&ctx, sample, SamplerConfig::default().with_polyphony(polyphony));
        for _ in 0..triggers {
            sampler.note_on();
        }
        let mut out = Buffer::new(&ctx);
        sampler.process(Inputs::none(), &mut out);
        let bound = level.abs() * polyphony as f32 + 1e-6;
        prop_assert!(out.as_slice().iter().all(|s| s.abs() <= bound));
    }
}
