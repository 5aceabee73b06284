//! Interactive sample pack player.
//!
//! Reads one command per line from stdin while the engine plays.

use super::EngineOverrides;
use anyhow::Context;
use clap::Args;
use std::io::BufRead;
use std::path::PathBuf;
use vesper_config::PackManifest;
use vesper_io::{Engine, WavLoader};
use vesper_sampler::{MusicCueOrchestrator, SamplePack};

#[derive(Args)]
pub struct PlayArgs {
    /// Sample pack manifest (TOML)
    manifest: PathBuf,
}

/// One line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Trigger(&'a str),
    Release(&'a str),
    Cue(&'a str),
    Stop,
    List,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Input<'_> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (None, _) => Input::Empty,
        (Some("quit" | "exit"), None) => Input::Quit,
        (Some("stop"), None) => Input::Stop,
        (Some("list"), None) => Input::List,
        (Some("cue"), Some(slug)) => Input::Cue(slug),
        (Some("release"), Some(slug)) => Input::Release(slug),
        (Some(slug), _) => Input::Trigger(slug),
    }
}

pub fn run(args: PlayArgs, overrides: &EngineOverrides) -> anyhow::Result<()> {
    let manifest = PackManifest::load(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    let ctx = overrides.apply(manifest.engine.context())?;
    let mut engine = Engine::with_device(ctx, overrides.device.as_deref())?;

    let loader = WavLoader::new(&manifest.samples_dir);
    let (pack, mut cues) = engine.with_graph(|graph| {
        let pack = SamplePack::new(graph, manifest.pack_items(), manifest.gain, &loader);
        let cues = MusicCueOrchestrator::new(graph, manifest.music_cues(), &loader);
        (pack, cues)
    });

    engine.start()?;
    println!("Playing on {}.", engine.device_name());
    print_help(&pack, &manifest);

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        match parse_line(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::List => print_help(&pack, &manifest),
            Input::Stop => engine.with_graph(|graph| cues.stop_cue(graph)),
            Input::Cue(slug) => {
                if !engine.with_graph(|graph| cues.play_cue(graph, slug)) {
                    println!("unknown cue '{slug}'");
                }
            }
            Input::Release(slug) => {
                if !engine.with_graph(|graph| pack.release(graph, slug)) {
                    println!("unknown sample '{slug}'");
                }
            }
            Input::Trigger(slug) => {
                if !engine.with_graph(|graph| pack.trigger(graph, slug)) {
                    println!("unknown sample '{slug}'");
                }
            }
        }
    }

    engine.stop();
    Ok(())
}

fn print_help(pack: &SamplePack, manifest: &PackManifest) {
    let samples: Vec<_> = pack.slugs().collect();
    let cues: Vec<_> = manifest.cues.iter().map(|c| c.slug.as_str()).collect();
    println!("Samples: {}", samples.join(", "));
    if !cues.is_empty() {
        println!("Cues:    {}", cues.join(", "));
    }
    println!("Type a sample slug to trigger it, 'release <slug>', 'cue <slug>', 'stop', 'list' or 'quit'.");
}
