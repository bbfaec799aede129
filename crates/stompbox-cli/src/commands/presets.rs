//! Preset management commands.
//!
//! Factory presets are built in and read-only; user presets live in the
//! file store under the platform config directory, one folder per user.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use stompbox_config::paths::user_presets_dir;
use stompbox_config::{FilePresetStore, Preset, PresetStore, factory_presets, is_factory_preset};
use stompbox_effects::{ParamKey, Pedal};

use super::common::{
    DEFAULT_USER, board_from_flags, find_preset, parse_param_assignment, parse_pedal,
};

#[derive(Args)]
pub struct PresetsArgs {
    /// User whose presets to use
    #[arg(long, global = true, default_value = DEFAULT_USER)]
    user: String,

    /// Preset store directory (defaults to the platform config directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<PresetsCommand>,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory and user presets
    List {
        /// Show only factory presets
        #[arg(long)]
        factory: bool,

        /// Show only user presets
        #[arg(long, conflicts_with = "factory")]
        mine: bool,
    },

    /// Print a preset as TOML
    Show {
        /// Preset id
        id: String,

        /// Print JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Save a new user preset
    Save {
        /// Display name
        name: String,

        /// Start from this preset
        #[arg(long)]
        from: Option<String>,

        /// Engage a pedal (repeatable)
        #[arg(long = "on", value_parser = parse_pedal)]
        on: Vec<Pedal>,

        /// Set a knob, e.g. delay.time=0.5 (repeatable)
        #[arg(long = "set", value_parser = parse_param_assignment)]
        set: Vec<(ParamKey, f32)>,

        /// Mark the new preset as active
        #[arg(long)]
        activate: bool,
    },

    /// Mark a user preset as active
    Activate {
        /// Preset id
        id: String,
    },

    /// Delete a user preset
    Delete {
        /// Preset id
        id: String,
    },

    /// Show the preset directory
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let mut store = match &args.store {
        Some(root) => FilePresetStore::new(root),
        None => FilePresetStore::open_default(),
    };
    let user = args.user.as_str();

    match args.command.unwrap_or(PresetsCommand::List {
        factory: false,
        mine: false,
    }) {
        PresetsCommand::List { factory, mine } => list(&store, user, !mine, !factory),
        PresetsCommand::Show { id, json } => show(&store, user, &id, json),
        PresetsCommand::Save {
            name,
            from,
            on,
            set,
            activate,
        } => {
            let base = from
                .as_deref()
                .map(|id| find_preset(&store, user, id))
                .transpose()?;
            let (state, params) = board_from_flags(base.as_ref(), &on, &set);
            let preset = store.save(user, &name, &state, &params)?;
            if activate {
                store.activate(&preset.id)?;
            }
            println!("Saved preset '{}' as {}", preset.name, preset.id);
            Ok(())
        }
        PresetsCommand::Activate { id } => {
            store
                .activate(&id)
                .with_context(|| format!("activating {id}"))?;
            println!("Active preset: {id}");
            Ok(())
        }
        PresetsCommand::Delete { id } => {
            if is_factory_preset(&id) {
                anyhow::bail!("'{id}' is a factory preset and cannot be deleted");
            }
            store.delete(&id).with_context(|| format!("deleting {id}"))?;
            println!("Deleted preset: {id}");
            Ok(())
        }
        PresetsCommand::Paths => {
            println!("User presets: {}", store.root().display());
            if args.store.is_some() {
                println!("Default:      {}", user_presets_dir().display());
            }
            Ok(())
        }
    }
}

fn list(
    store: &FilePresetStore,
    user: &str,
    show_factory: bool,
    show_user: bool,
) -> anyhow::Result<()> {
    if show_factory {
        println!("Factory Presets:");
        println!("================");
        for preset in factory_presets() {
            print_line(&preset, false);
        }
        println!();
    }

    if show_user {
        println!("User Presets ({user}):");
        println!("=============");
        let presets = store.list(user)?;
        if presets.is_empty() {
            println!("  (none)");
            println!();
            println!("  Create one with: stompbox presets save \"My Tone\" --from blues\n");
        } else {
            let active = store.active(user)?.map(|p| p.id);
            for preset in &presets {
                print_line(preset, active.as_deref() == Some(preset.id.as_str()));
            }
            println!();
        }
    }
    Ok(())
}

fn print_line(preset: &Preset, active: bool) {
    let marker = if active { "*" } else { " " };
    let desc = preset.description.as_deref().unwrap_or("");
    println!(
        " {marker}{:24} {:20} {:8} {desc}",
        preset.id,
        preset.name,
        preset.category.as_str()
    );
}

fn show(store: &FilePresetStore, user: &str, id: &str, json: bool) -> anyhow::Result<()> {
    let preset = find_preset(store, user, id)?;
    let text = if json { preset.to_json()? } else { preset.to_toml()? };
    println!("{text}");
    if !json {
        let engaged: Vec<String> = preset.pedal_state.engaged().map(|p| p.to_string()).collect();
        println!("# engaged: {}", engaged.join(", "));
    }
    Ok(())
}
