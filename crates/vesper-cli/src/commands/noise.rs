//! White-noise demo: noise -> gain 0.5 -> output gain.

use super::EngineOverrides;
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use vesper_core::{AudioContext, Gain, NoiseGenerator};
use vesper_io::Engine;

#[derive(Args)]
pub struct NoiseArgs {
    /// Output gain applied after the fixed 0.5 stage
    #[arg(long, default_value = "1.0")]
    gain: f32,
}

pub fn run(args: NoiseArgs, overrides: &EngineOverrides) -> anyhow::Result<()> {
    let ctx = overrides.apply(AudioContext::default())?;
    let mut engine = Engine::with_device(ctx, overrides.device.as_deref())?;

    engine.with_graph(|graph| {
        let noise = graph.add_node(NoiseGenerator::new);
        let half = graph.add_node(|ctx| Gain::new(ctx, 0.5));
        let out = graph.add_node(|ctx| Gain::new(ctx, args.gain));
        graph.connect(noise, half);
        graph.connect(half, out);
    });

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    engine.start()?;
    println!(
        "Playing noise on {} at gain {}... Press Ctrl+C to stop.",
        engine.device_name(),
        args.gain
    );

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }
    engine.stop();
    Ok(())
}
