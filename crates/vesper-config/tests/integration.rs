//! Integration tests for vesper-config.
//!
//! These build a pack and cues from a manifest on disk and render them.

use tempfile::TempDir;
use vesper_config::{ConfigError, PackManifest, SampleEntry};
use vesper_core::{AudioContext, AudioGraph, Buffer};
use vesper_sampler::{MusicCueOrchestrator, SampleData, SamplePack};

#[test]
fn test_load_resolves_samples_dir_next_to_manifest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pack.toml");
    std::fs::write(&path, "samples_dir = \"sounds\"\n").unwrap();

    let manifest = PackManifest::load(&path).unwrap();
    assert_eq!(manifest.samples_dir, dir.path().join("sounds"));
}

#[test]
fn test_load_keeps_absolute_samples_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pack.toml");
    let abs = dir.path().join("elsewhere");
    std::fs::write(&path, format!("samples_dir = {:?}\n", abs.display().to_string())).unwrap();

    let manifest = PackManifest::load(&path).unwrap();
    assert_eq!(manifest.samples_dir, abs);
}

#[test]
fn test_load_missing_file_reports_path() {
    let err = PackManifest::load("/nonexistent/pack.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("/nonexistent/pack.toml"));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");
    let mut manifest = PackManifest {
        samples_dir: dir.path().to_path_buf(),
        ..PackManifest::default()
    };
    let mut entry = SampleEntry::new("clap", "clap.wav");
    entry.polyphony = 3;
    manifest.samples.push(entry);

    manifest.save(&path).unwrap();
    assert_eq!(PackManifest::load(&path).unwrap(), manifest);
}

#[test]
fn test_manifest_builds_pack_and_cues() {
    let manifest = PackManifest::from_toml(
        r#"
gain = 0.5

[engine]
block_size = 4
channels = 1
sample_rate = 48000

[[samples]]
slug = "hit"
file = "hit.wav"
gain = 2.0

[[cues]]
slug = "theme"
file = "theme.wav"
gain = 0.25
"#,
    )
    .unwrap();

    let ctx = manifest.engine.context();
    let mut graph = AudioGraph::new(ctx);
    let loader = |_: &str, _: &AudioContext| SampleData::from_interleaved(vec![1.0; 4], 1);
    let pack = SamplePack::new(&mut graph, manifest.pack_items(), manifest.gain, &loader);
    let mut cues = MusicCueOrchestrator::new(&mut graph, manifest.music_cues(), &loader);

    assert!(pack.trigger(&mut graph, "hit"));
    assert!(cues.play_cue(&mut graph, "theme"));

    let mut out = Buffer::new(&ctx);
    graph.render(&mut out);
    // hit: 1.0 * 2.0 * 0.5, theme: 1.0 * 0.25
    assert_eq!(out.as_slice(), &[1.25; 4]);
}
