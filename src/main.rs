mod catalog;
mod cli;
mod config;
mod controller;
mod enumerate;
mod midi;
mod pads;
mod preset;
mod state;
mod tui;

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use cli::{Cli, Command, EnumerateTarget};
use controller::Controller;
use midi::{MidiOut, PadListener, Transport};
use preset::{FileStorage, PresetStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load(&config_path)?;
    if let Some(device) = cli.device {
        cfg.device.name = device;
    }
    if let Some(store) = cli.store {
        cfg.presets.path = Some(store);
    }
    config::init(cfg);

    match cli.command {
        None => {
            let store = open_store()?;
            let out = connect();
            tui::run(Controller::new(out), store)
        }
        Some(Command::Enumerate(target)) => match target {
            EnumerateTarget::Midi => enumerate::midi(),
            EnumerateTarget::Effects { bus } => enumerate::effects(bus),
            EnumerateTarget::Presets => enumerate::presets(&open_store()?),
        },
        Some(Command::Describe { effect, bus }) => enumerate::describe(&effect, bus),
        Some(Command::Send { bus, cc, value }) => {
            let mut controller = Controller::new(connect());
            controller.send_raw(bus, cc, value)?;
            if !controller.transport().is_connected() {
                println!("(offline) nothing was sent");
            }
            Ok(())
        }
        Some(Command::Load { preset: name }) => {
            let store = open_store()?;
            let mut controller = Controller::new(connect());
            if !store.load(&name, &mut controller) {
                anyhow::bail!(
                    "no preset named '{name}' (available: {})",
                    store.names().collect::<Vec<_>>().join(", ")
                );
            }
            println!("Loaded '{name}'");
            Ok(())
        }
        Some(Command::Delete { preset: name, yes }) => {
            let mut store = open_store()?;
            let deleted = store.delete(&name, |n| yes || confirm(&format!("Delete preset \"{n}\"?")))?;
            if deleted {
                println!("Deleted '{name}'");
            } else if store.get(&name).is_none() {
                println!("No preset named '{name}'");
            }
            Ok(())
        }
        Some(Command::Import { file }) => {
            let document = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?;
            let mut store = open_store()?;
            let count = store.import(&document)?;
            println!("Imported {count} preset(s) from {}", file.display());
            Ok(())
        }
        Some(Command::Monitor) => monitor(),
    }
}

/// Open the preset document, seeding the built-in set on first use.
fn open_store() -> anyhow::Result<PresetStore<FileStorage>> {
    let path = config::preset_path();
    let mut store = PresetStore::open(FileStorage::new(&path))
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    store.seed_defaults()?;
    Ok(store)
}

fn connect() -> MidiOut {
    MidiOut::connect(config::device_name(), config::client_name())
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn monitor() -> anyhow::Result<()> {
    let (tx, rx) = crossbeam_channel::bounded::<midi::RawEvent>(256);
    let mut listener = PadListener::new(tx, config::device_name(), config::client_name());
    if listener.open_ports()? == 0 {
        log::warn!(
            "No MIDI input matching '{}' yet — waiting for the device",
            config::device_name()
        );
    }
    log::info!("Monitoring pads. Ctrl+C to quit.");

    let mut last_poll = Instant::now();
    loop {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(250)) {
            if let Some(cell) = pads::decode(event) {
                println!(
                    "pad {:>2}  col={} row={}  (ch {})",
                    cell.number(),
                    cell.col,
                    cell.row,
                    (event[0] & 0x0F) + 1
                );
            }
        }

        if last_poll.elapsed() >= Duration::from_secs(1) {
            listener.poll_new_devices();
            last_poll = Instant::now();
        }
    }
}
