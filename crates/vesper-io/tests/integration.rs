//! Integration tests for vesper-io.
//!
//! These exercise the decode collaborator and the block adapter against a
//! real graph. Nothing here opens an audio device.

use tempfile::tempdir;
use vesper_core::{AudioContext, AudioGraph, Gain};
use vesper_io::{BlockStream, WavLoader, WavSpec, decode_wav, write_wav};
use vesper_sampler::{SamplePack, SamplePackItem, SampleLoader, Sampler};

#[test]
fn wav_written_at_other_shape_decodes_to_engine_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    // Two stereo frames at 24 kHz.
    write_wav(
        &path,
        &[0.2, 0.4, 0.6, 0.8],
        WavSpec {
            channels: 2,
            sample_rate: 24000,
            bits_per_sample: 32,
        },
    )
    .unwrap();

    let data = decode_wav(&path, 1, 48000.0).unwrap();
    assert_eq!(data.channels(), 1);
    assert_eq!(data.frames(), 4);
    let expected = [0.3, 0.5, 0.7, 0.7];
    for (got, want) in data.as_slice().iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
    }
}

#[test]
fn pack_loaded_from_disk_plays_through_graph() {
    let dir = tempdir().unwrap();
    write_wav(
        dir.path().join("kick.wav"),
        &[1.0, 0.5, 0.25, 0.125],
        WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        },
    )
    .unwrap();

    let ctx = AudioContext::new(4, 1, 48000.0);
    let mut graph = AudioGraph::new(ctx);
    let loader = WavLoader::new(dir.path());
    let pack = SamplePack::new(
        &mut graph,
        vec![
            SamplePackItem::new("kick", "kick.wav"),
            SamplePackItem::new("snare", "snare.wav"),
        ],
        0.5,
        &loader,
    );

    let snare = pack.sampler_node("snare").unwrap();
    assert!(graph.node::<Sampler>(snare).unwrap().sample().is_empty());

    assert!(pack.trigger(&mut graph, "kick"));
    assert!(pack.trigger(&mut graph, "snare"));

    let mut stream = BlockStream::new(graph.context());
    let mut out = [0.0f32; 6];
    stream.fill(&mut out, |block| graph.render(block));
    assert_eq!(out, [0.5, 0.25, 0.125, 0.0625, 0.0, 0.0]);
}

#[test]
fn loader_shapes_follow_context() {
    let dir = tempdir().unwrap();
    write_wav(dir.path().join("tone.wav"), &[0.5; 16], WavSpec::default()).unwrap();
    let loader = WavLoader::new(dir.path());

    let stereo = loader.load("tone.wav", &AudioContext::new(8, 2, 48000.0));
    assert_eq!((stereo.channels(), stereo.frames()), (2, 8));

    let mono = loader.load("tone.wav", &AudioContext::new(8, 1, 48000.0));
    assert_eq!((mono.channels(), mono.frames()), (1, 8));

    let upsampled = loader.load("tone.wav", &AudioContext::new(8, 2, 96000.0));
    assert_eq!(upsampled.frames(), 16);
}

#[test]
fn block_stream_follows_graph_context_change() {
    let ctx = AudioContext::new(4, 2, 48000.0);
    let mut graph = AudioGraph::new(ctx);
    graph.add_node(|ctx| Gain::new(ctx, 1.0));

    let mut stream = BlockStream::new(graph.context());
    let mut out = [1.0f32; 5];
    stream.fill(&mut out, |block| graph.render(block));
    assert_eq!(out, [0.0; 5]);

    let resized = ctx.with_block_size(16);
    graph.set_audio_context(resized);
    stream.set_context(&resized);
    assert_eq!(stream.buffered(), 0);

    let mut out = [1.0f32; 32];
    stream.fill(&mut out, |block| {
        assert_eq!(block.len(), 32);
        graph.render(block);
    });
    assert_eq!(stream.buffered(), 0);
}
