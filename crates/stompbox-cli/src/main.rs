//! Stompbox CLI - terminal front end for the stompbox pedalboard.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stompbox")]
#[command(author, version, about = "Stompbox guitar pedalboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio devices
    Devices(commands::devices::DevicesArgs),

    /// List, inspect and manage presets
    Presets(commands::presets::PresetsArgs),

    /// Play through the pedalboard in real time
    Live(commands::live::LiveArgs),

    /// Print or write the engine configuration
    Config(commands::config::ConfigArgs),

    /// List pedals and their knobs
    Pedals,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices(args) => commands::devices::run(&args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Live(args) => commands::live::run(&args),
        Commands::Config(args) => commands::config::run(&args),
        Commands::Pedals => commands::pedals::run(),
    }
}
