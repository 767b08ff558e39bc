use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::BUS_COUNT;

#[derive(Parser)]
#[command(name = "sp404ctl", about = "Control surface for the SP-404MKII effect buses")]
pub struct Cli {
    /// Config file (default: <config dir>/sp404ctl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Preset document (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// MIDI port name filter (overrides the config file)
    #[arg(long, global = true)]
    pub device: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List MIDI ports, effects or stored presets
    #[command(subcommand)]
    Enumerate(EnumerateTarget),
    /// Show the parameters and CC numbers of an effect
    Describe {
        /// Effect name, e.g. "303 VinylSim"
        effect: String,

        /// Bus whose catalog to look in (0-3 effect buses, 4 input)
        #[arg(long, default_value = "0", value_parser = parse_bus)]
        bus: usize,
    },
    /// Send a single Control Change to a bus
    Send {
        /// Bus index (0-4), also the MIDI channel
        #[arg(value_parser = parse_bus)]
        bus: usize,
        /// CC number
        cc: i32,
        /// Value (clamped to 0-127)
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Load a stored preset and replay it to the device
    Load {
        preset: String,
    },
    /// Delete a stored preset
    Delete {
        preset: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Merge presets from another preset document (old formats accepted)
    Import {
        file: PathBuf,
    },
    /// Print pad hits from the device until interrupted
    Monitor,
}

#[derive(Subcommand)]
pub enum EnumerateTarget {
    /// List MIDI output and input ports
    Midi,
    /// List the effect catalog of a bus
    Effects {
        #[arg(long, default_value = "0", value_parser = parse_bus)]
        bus: usize,
    },
    /// List stored presets
    Presets,
}

fn parse_bus(arg: &str) -> Result<usize, String> {
    let bus: usize = arg.parse().map_err(|_| format!("'{arg}' is not a bus index"))?;
    if bus >= BUS_COUNT {
        return Err(format!("no bus {bus} (expected 0-{})", BUS_COUNT - 1));
    }
    Ok(bus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_arguments_stop_at_the_input_bus() {
        let cli = Cli::try_parse_from(["sp404ctl", "send", "4", "16", "64"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Send { bus: 4, .. })));

        assert!(Cli::try_parse_from(["sp404ctl", "send", "5", "16", "64"]).is_err());
        assert!(Cli::try_parse_from(["sp404ctl", "describe", "Harmony", "--bus", "9"]).is_err());
        assert!(Cli::try_parse_from(["sp404ctl", "enumerate", "effects", "--bus", "5"]).is_err());
        assert!(Cli::try_parse_from(["sp404ctl", "enumerate", "effects", "--bus", "x"]).is_err());
    }
}
