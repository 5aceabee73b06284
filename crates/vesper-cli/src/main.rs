//! Vesper CLI - command-line front end for the vesper audio engine.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vesper")]
#[command(author, version, about = "Vesper real-time audio engine", long_about = None)]
struct Cli {
    #[command(flatten)]
    engine: commands::EngineOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Load a sample pack manifest and trigger samples from stdin
    Play(commands::play::PlayArgs),

    /// Play white noise through a gain chain until Ctrl+C
    Noise(commands::noise::NoiseArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Play(args) => commands::play::run(args, &cli.engine),
        Commands::Noise(args) => commands::noise::run(args, &cli.engine),
    }
}
