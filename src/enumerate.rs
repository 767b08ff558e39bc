use crate::catalog::{self, BUS_COUNT};
use crate::config;
use crate::preset::{PresetStore, Storage};

pub fn midi() -> anyhow::Result<()> {
    let client = config::client_name();
    let device = config::device_name();

    println!("=== MIDI Outputs ===");
    print_ports(&crate::midi::list_outputs(client)?, device);
    println!();
    println!("=== MIDI Inputs ===");
    print_ports(&crate::midi::list_inputs(client)?, device);
    Ok(())
}

fn print_ports(ports: &[String], device: &str) {
    if ports.is_empty() {
        println!("  (none found)");
    }
    // Only the first match is used, so mark just that one.
    let first_match = ports.iter().position(|p| p.contains(device));
    for (i, name) in ports.iter().enumerate() {
        let marker = if Some(i) == first_match { " *" } else { "" };
        println!("  {name}{marker}");
    }
}

pub fn effects(bus: usize) -> anyhow::Result<()> {
    check_bus(bus)?;
    println!("=== {} Effects ===", catalog::bus_label(bus));
    for (index, name) in catalog::effects_for(bus).iter().enumerate() {
        let count = catalog::parameters_for(name).len();
        println!("  {index:>3}  {name:<14} ({count} params)");
    }
    Ok(())
}

pub fn presets<S: Storage>(store: &PresetStore<S>) -> anyhow::Result<()> {
    println!("=== Presets ===");
    if store.is_empty() {
        println!("  (none)");
    }
    for (name, preset) in store.iter() {
        println!("  {name}");
        if !preset.description.is_empty() {
            println!("          {}", preset.description);
        }
        for (bus, b) in preset.state.buses.iter().enumerate() {
            if b.effect_index == 0 {
                continue;
            }
            let effect = catalog::effect_name(bus, b.effect_index).unwrap_or("?");
            println!(
                "          {:<6} {effect} {:?}",
                catalog::bus_label(bus),
                b.knobs
            );
        }
    }
    Ok(())
}

pub fn describe(effect: &str, bus: usize) -> anyhow::Result<()> {
    check_bus(bus)?;
    let index = catalog::BusCategory::for_bus(bus).and_then(|c| catalog::index_of(c, effect));
    let Some(index) = index else {
        anyhow::bail!(
            "{effect} is not available on {}\nRun `sp404ctl enumerate effects --bus {bus}` for the list.",
            catalog::bus_label(bus)
        );
    };
    println!("{effect}");
    println!("  Bus:         {}", catalog::bus_label(bus));
    println!("  Index:       {index} (CC {})", catalog::EFX_SELECT_CC);
    let params = catalog::parameters_for(effect);
    println!("  Parameters:  {}", params.len());
    for (slot, p) in params.iter().enumerate() {
        println!("    [CTRL {}] {:<12} CC {}", slot + 1, p.name, p.cc);
    }
    Ok(())
}

fn check_bus(bus: usize) -> anyhow::Result<()> {
    if bus >= BUS_COUNT {
        anyhow::bail!("no bus {bus} (expected 0-{})", BUS_COUNT - 1);
    }
    Ok(())
}
