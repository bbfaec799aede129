//! Real-time playing through the pedalboard.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use stompbox_config::{EngineConfig, FilePresetStore, Preset, PresetStore};
use stompbox_effects::{ParamKey, Pedal};
use stompbox_engine::{BEATS_PER_BAR, EngineController, EngineSnapshot, MAX_BPM, MIN_BPM};
use stompbox_io::CpalBackend;

use super::common::{
    DEFAULT_USER, board_from_flags, find_preset, parse_param_assignment, parse_pedal,
};

/// Host loop period.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Status line refresh period.
const STATUS_INTERVAL: Duration = Duration::from_millis(100);

const METER_WIDTH: usize = 20;

#[derive(Args)]
pub struct LiveArgs {
    /// Start from a factory or user preset
    #[arg(short, long)]
    preset: Option<String>,

    /// Start from the user's active preset
    #[arg(long, conflicts_with = "preset")]
    active: bool,

    /// User whose presets to search
    #[arg(long, default_value = DEFAULT_USER)]
    user: String,

    /// Engage a pedal (repeatable)
    #[arg(long = "on", value_parser = parse_pedal)]
    on: Vec<Pedal>,

    /// Set a knob, e.g. delay.time=0.5 (repeatable)
    #[arg(long = "set", value_parser = parse_param_assignment)]
    set: Vec<(ParamKey, f32)>,

    /// Master volume, 0..1
    #[arg(long)]
    volume: Option<f32>,

    /// Run the click metronome at this tempo
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_BPM)..=i64::from(MAX_BPM))
    )]
    bpm: Option<u32>,

    /// Engine config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input device name
    #[arg(long)]
    input_device: Option<String>,

    /// Output device name
    #[arg(long)]
    output_device: Option<String>,
}

pub fn run(args: &LiveArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::load_or_default()?,
    };
    if args.input_device.is_some() {
        config.input_device.clone_from(&args.input_device);
    }
    if args.output_device.is_some() {
        config.output_device.clone_from(&args.output_device);
    }

    let store = FilePresetStore::open_default();
    let base = if let Some(id) = &args.preset {
        Some(find_preset(&store, &args.user, id)?)
    } else if args.active {
        Some(
            store
                .active(&args.user)?
                .with_context(|| format!("no active preset for '{}'", args.user))?,
        )
    } else {
        None
    };

    let (state, mut params) = board_from_flags(base.as_ref(), &args.on, &args.set);
    if let Some(volume) = args.volume {
        params.volume = ParamKey::Volume.descriptor().clamp(volume);
    }
    let mut board = Preset::new("live", "Live").with_state(state).with_params(params);
    if let Some(base) = &base {
        board.name.clone_from(&base.name);
    }

    let mut engine = EngineController::new(Box::new(CpalBackend::new()), config);
    engine.apply_preset(&board);
    if let Some(bpm) = args.bpm {
        engine.set_bpm(bpm);
        engine.start_metronome();
    }

    println!("Stompbox live");
    println!("  Preset:  {}", board.name);
    let engaged: Vec<String> = board.pedal_state.engaged().map(|p| p.to_string()).collect();
    if engaged.is_empty() {
        println!("  Pedals:  (all bypassed)");
    } else {
        println!("  Pedals:  {}", engaged.join(" > "));
    }
    println!("  Volume:  {:.2}", board.params.volume);
    if let Some(bpm) = args.bpm {
        println!("  Click:   {bpm} BPM");
    }

    if let Err(err) = engine.connect() {
        tracing::debug!(error = %err, "connect failed");
        anyhow::bail!(err.user_message());
    }

    if let (Some(sr), Some(nodes)) = (engine.sample_rate(), engine.node_count()) {
        println!(
            "  Audio:   {sr} Hz, {} frames, {nodes} nodes",
            engine.config().buffer_size
        );
    }
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut last_status = Instant::now();
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        engine.poll(now);
        if !engine.is_connected() {
            break;
        }
        if now.duration_since(last_status) >= STATUS_INTERVAL {
            print_status(&engine.snapshot());
            last_status = now;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    println!();
    let failure = engine.error().map(str::to_string);
    engine.disconnect();
    match failure {
        Some(message) => anyhow::bail!(message),
        None => {
            println!("Stopped.");
            Ok(())
        }
    }
}

fn print_status(snap: &EngineSnapshot) {
    print!("\r{}", status_line(snap));
    let _ = std::io::stdout().flush();
}

fn status_line(snap: &EngineSnapshot) -> String {
    let filled = (snap.input_level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize;
    let meter = format!("{}{}", "#".repeat(filled), " ".repeat(METER_WIDTH - filled));

    let tuner = if !snap.pedal_state.tuner {
        String::new()
    } else if snap.tuner_data.is_pitched() {
        let t = &snap.tuner_data;
        format!(
            "  tuner {}{} {:+3}c {:7.2} Hz",
            t.note, t.octave, t.cents, t.frequency
        )
    } else {
        "  tuner  --".to_string()
    };

    let click = if snap.metronome.running {
        format!("  beat {}/{BEATS_PER_BAR}", snap.metronome.beat + 1)
    } else {
        String::new()
    };

    let stats = &snap.performance_stats;
    format!(
        "in [{meter}] {:4.2}  cpu {:4.1}%  {:4.1} ms{tuner}{click}   ",
        snap.input_level, stats.cpu, stats.latency_ms
    )
}
