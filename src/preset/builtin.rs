//! Presets seeded into an empty store.

use crate::catalog::{BusCategory, index_of};
use crate::state::{BusState, ControllerState};

use super::Preset;

struct BusSeed {
    bus: usize,
    effect: &'static str,
    knobs: [u8; 6],
}

struct Seed {
    name: &'static str,
    description: &'static str,
    buses: &'static [BusSeed],
}

const fn on(bus: usize, effect: &'static str, knobs: [u8; 6]) -> BusSeed {
    BusSeed { bus, effect, knobs }
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Drum Punch",
        description: "Use Isolator to boost the low end of a kick or snare, and the compressor to add punch and glue.",
        buses: &[
            on(0, "Isolator", [80, 63, 63, 63, 63, 63]),
            on(1, "Compressor", [80, 63, 90, 100, 63, 63]),
        ],
    },
    Seed {
        name: "Melody Atmos",
        description: "Classic combo to create atmosphere and movement for melodic samples. Filter to shape, then add space.",
        buses: &[
            on(0, "Filter+Drive", [80, 70, 50, 63, 63, 63]),
            on(1, "Sync Delay", [75, 80, 70, 63, 63, 127]),
        ],
    },
    Seed {
        name: "Evolving Texture",
        description: "Use Resonator and Delay to create unique, evolving textures and pitched effects.",
        buses: &[
            on(0, "Resonator", [63, 80, 70, 80, 63, 63]),
            on(1, "Sync Delay", [90, 90, 60, 63, 63, 127]),
        ],
    },
    Seed {
        name: "Warm Master",
        description: "A mastering chain to add warmth, glue, and character. Great for the final mix.",
        buses: &[
            on(2, "Cassette Sim", [50, 60, 70, 63, 63, 63]),
            on(3, "Compressor", [70, 63, 80, 90, 63, 63]),
        ],
    },
    Seed {
        name: "Vinyl Master",
        description: "An alternative mastering chain using the classic Vinyl Sim for character. Use the EQ to shape the final tone.",
        buses: &[
            on(2, "Isolator", [63, 63, 63, 63, 63, 63]),
            on(3, "303 VinylSim", [63, 80, 50, 90, 63, 63]),
            on(4, "Equalizer", [63, 63, 63, 63, 63, 63]),
        ],
    },
    Seed {
        name: "Live Looper",
        description: "A performance setup. Use BUS 1 for on-the-fly looping effects on your melodic samples.",
        buses: &[on(0, "DJFX Looper", [127, 100, 127, 63, 63, 63])],
    },
    Seed {
        name: "Lo-fi Crunch",
        description: "Use Distortion and the Lo-fi effect to add crunch and character to drums or samples.",
        buses: &[
            on(0, "Distortion", [80, 70, 90, 90, 63, 63]),
            on(1, "Lo-fi", [63, 63, 63, 80, 90, 100]),
        ],
    },
];

/// The built-in preset set, effects resolved against the bus catalogs.
/// Buses a seed does not mention keep the fresh-bus defaults.
pub fn presets() -> Vec<(String, Preset)> {
    SEEDS
        .iter()
        .map(|seed| {
            let mut state = ControllerState::default();
            for b in seed.buses {
                match BusCategory::for_bus(b.bus).and_then(|c| index_of(c, b.effect)) {
                    Some(effect_index) => {
                        state.buses[b.bus] = BusState {
                            effect_index,
                            knobs: b.knobs,
                            ..BusState::default()
                        };
                    }
                    None => log::warn!(
                        "Built-in preset '{}': no {} on bus {}",
                        seed.name,
                        b.effect,
                        b.bus
                    ),
                }
            }
            (seed.name.to_string(), Preset::new(seed.description, state))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::effect_name;

    #[test]
    fn every_seed_effect_resolves() {
        for seed in SEEDS {
            for b in seed.buses {
                assert!(
                    BusCategory::for_bus(b.bus).and_then(|c| index_of(c, b.effect)).is_some(),
                    "{}: {} on bus {}",
                    seed.name,
                    b.effect,
                    b.bus
                );
            }
        }
    }

    #[test]
    fn seeded_states_point_at_named_effects() {
        let presets = presets();
        assert_eq!(presets.len(), SEEDS.len());
        let (name, vinyl) = &presets[4];
        assert_eq!(name, "Vinyl Master");
        assert_eq!(effect_name(3, vinyl.state.buses[3].effect_index), Some("303 VinylSim"));
        assert_eq!(effect_name(4, vinyl.state.buses[4].effect_index), Some("Equalizer"));
        assert_eq!(vinyl.state.buses[0], BusState::default());
        assert!(!vinyl.description.is_empty());
    }
}
