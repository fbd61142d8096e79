//! fmosc CLI - play, render and inspect a two-operator FM voice.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fmosc")]
#[command(author, version, about = "FM oscillator voice CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a voice on an audio device
    Play(commands::play::PlayArgs),

    /// Render a voice to a WAV file
    Render(commands::render::RenderArgs),

    /// Step a voice across a range of keys
    Glide(commands::glide::GlideArgs),

    /// Show the keyboard note table
    Notes(commands::notes::NotesArgs),

    /// List, show and save voice presets
    Presets(commands::presets::PresetsArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Find spectral peaks in a WAV file
    Analyze(commands::analyze::AnalyzeArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Glide(args) => commands::glide::run(args),
        Commands::Notes(args) => commands::notes::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
    }
}
