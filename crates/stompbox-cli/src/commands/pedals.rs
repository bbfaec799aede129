//! Pedal and knob listing.

use stompbox_effects::{CHAIN_ORDER, ParamKey, Pedal};

pub fn run() -> anyhow::Result<()> {
    println!("Pedals (signal order)");
    println!("=====================\n");

    for pedal in CHAIN_ORDER {
        print_pedal(pedal);
    }
    println!("  tuner");
    println!("    (no knobs, reads the dry input)\n");

    let volume = ParamKey::Volume.descriptor();
    println!(
        "Master: volume {:.2}..{:.2} (default {:.2})",
        volume.min, volume.max, volume.default
    );
    println!();
    println!("Set a knob with: stompbox live --set delay.time=0.5");
    Ok(())
}

fn print_pedal(pedal: Pedal) {
    println!("  {pedal}");
    for key in ParamKey::ALL.into_iter().filter(|k| k.pedal() == Some(pedal)) {
        let d = key.descriptor();
        println!(
            "    {:<24} {:>9.3} .. {:<9.3} default {}",
            key.to_string(),
            d.min,
            d.max,
            d.default
        );
    }
    println!();
}
