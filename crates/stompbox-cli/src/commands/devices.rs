//! Audio device listing.

use clap::Args;
use stompbox_io::{AudioBackend, AudioDevice, CpalBackend};

#[derive(Args)]
pub struct DevicesArgs {
    /// Show only the default input and output
    #[arg(long)]
    defaults: bool,
}

pub fn run(args: &DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();

    if args.defaults {
        print_default("Input", backend.default_input_device()?);
        print_default("Output", backend.default_output_device()?);
        return Ok(());
    }

    let devices = backend.list_devices()?;
    if devices.is_empty() {
        println!("No audio devices found.");
        return Ok(());
    }

    println!("Audio Devices ({})", backend.name());
    println!("=============\n");

    let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
    let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
    print_group("Input Devices", &inputs);
    print_group("Output Devices", &outputs);

    println!(
        "Total: {} input(s), {} output(s)",
        inputs.len(),
        outputs.len()
    );
    println!();
    println!("Pick a device by name in engine.toml (input_device / output_device).");
    Ok(())
}

fn print_group(title: &str, devices: &[&AudioDevice]) {
    if devices.is_empty() {
        return;
    }
    println!("{title}:");
    for (idx, device) in devices.iter().enumerate() {
        println!(
            "  [{idx}] {} ({} Hz)",
            device.name, device.default_sample_rate
        );
    }
    println!();
}

fn print_default(kind: &str, device: Option<AudioDevice>) {
    match device {
        Some(device) => println!(
            "Default {kind}: {} ({} Hz)",
            device.name, device.default_sample_rate
        ),
        None => println!("Default {kind}: none"),
    }
}
