//! Engine configuration command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use stompbox_config::EngineConfig;
use stompbox_config::paths::{engine_config_path, ensure_dir};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default configuration to disk instead of printing it
    #[arg(long)]
    write: bool,

    /// Target file (defaults to the platform config directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Replace an existing file
    #[arg(long, requires = "write")]
    force: bool,

    /// Print the configuration currently in effect rather than the defaults
    #[arg(long, conflicts_with = "write")]
    current: bool,
}

pub fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    let path = args.path.clone().unwrap_or_else(engine_config_path);

    if !args.write {
        let config = if args.current {
            if path.exists() {
                EngineConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };
        println!("# {}", path.display());
        print!("{}", config.to_toml()?);
        println!(
            "# buffer latency: {:.2} ms",
            config.buffer_latency_ms()
        );
        return Ok(());
    }

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to replace it)",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    EngineConfig::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
