//! Static effect and parameter tables for the SP-404MKII effect buses.
//!
//! Effect indices are the values sent on [`EFX_SELECT_CC`]; they are wire
//! identifiers, so entries are only ever appended to these lists.

/// Number of buses: four effect buses plus the input bus.
pub const BUS_COUNT: usize = 5;

/// Number of physical knobs (CTRL 1–6) per bus.
pub const KNOB_COUNT: usize = 6;

/// CC that selects the effect slot on a bus.
pub const EFX_SELECT_CC: u8 = 83;

/// CC numbers of CTRL 1–6, indexed by parameter slot.
pub const CTRL_CCS: [u8; KNOB_COUNT] = [16, 17, 18, 80, 81, 82];

/// Display name of effect index 0 on every bus.
pub const OFF: &str = "(OFF)";

/// Label rendered for a knob that has no parameter behind it.
pub const INERT_LABEL: &str = "---";

const BUS_LABELS: [&str; BUS_COUNT] = ["BUS 1", "BUS 2", "BUS 3", "BUS 4", "INPUT"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusCategory {
    /// Buses 1 and 2.
    LowBus,
    /// Buses 3 and 4.
    HighBus,
    /// The input bus.
    InputBus,
}

impl BusCategory {
    /// Category of `bus`, or `None` past the input bus.
    pub fn for_bus(bus: usize) -> Option<Self> {
        match bus {
            0 | 1 => Some(BusCategory::LowBus),
            2 | 3 => Some(BusCategory::HighBus),
            4 => Some(BusCategory::InputBus),
            _ => None,
        }
    }

    pub fn effects(self) -> &'static [&'static str] {
        match self {
            BusCategory::LowBus => LOW_BUS_EFFECTS,
            BusCategory::HighBus => HIGH_BUS_EFFECTS,
            BusCategory::InputBus => INPUT_BUS_EFFECTS,
        }
    }
}

/// A controllable parameter of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub cc: u8,
}

/// Effects available on `bus`, in wire order. Empty for an unknown bus.
pub fn effects_for(bus: usize) -> &'static [&'static str] {
    BusCategory::for_bus(bus)
        .map(BusCategory::effects)
        .unwrap_or(&[])
}

/// Name of effect `index` on `bus`, if the catalog has one.
pub fn effect_name(bus: usize, index: usize) -> Option<&'static str> {
    effects_for(bus).get(index).copied()
}

/// Reverse lookup of an effect's wire index within a category.
pub fn index_of(category: BusCategory, name: &str) -> Option<usize> {
    category.effects().iter().position(|e| *e == name)
}

/// Parameters of an effect, possibly fewer than six. Unknown names have none.
pub fn parameters_for(effect: &str) -> &'static [Parameter] {
    PARAMETERS
        .iter()
        .find(|(name, _)| *name == effect)
        .map(|(_, params)| *params)
        .unwrap_or(&[])
}

/// Parameters of the effect at `index` on `bus`; empty when out of range.
pub fn parameters_at(bus: usize, index: usize) -> &'static [Parameter] {
    effect_name(bus, index).map(parameters_for).unwrap_or(&[])
}

/// CC to transmit for `slot` of an effect. Slots without a catalog entry
/// fall back to the CTRL CC of that slot.
pub fn cc_for(params: &[Parameter], slot: usize) -> u8 {
    match params.get(slot) {
        Some(p) => p.cc,
        None => CTRL_CCS[slot % KNOB_COUNT],
    }
}

pub fn bus_label(bus: usize) -> &'static str {
    BUS_LABELS.get(bus).copied().unwrap_or("?")
}

pub fn bus_labels() -> &'static [&'static str] {
    &BUS_LABELS
}

const LOW_BUS_EFFECTS: &[&str] = &[
    OFF,
    "Direct FX1",
    "Direct FX2",
    "Direct FX3",
    "Direct FX4",
    "Direct FX5",
    "Filter+Drive",
    "Resonator",
    "Sync Delay",
    "Scatter",
    "Downer",
    "Ha-Dou",
    "Ko-Da-Ma",
    "Zan-Zou",
    "To-Gu-Ro",
    "SBF",
    "Stopper",
    "Tape Echo",
    "TimeCtrlDly",
    "Super Filter",
    "WrmSaturator",
    "303 VinylSim",
    "404 VinylSim",
    "Cassette Sim",
    "Lo-fi",
    "Reverb",
    "Chorus",
    "JUNO Chorus",
    "Flanger",
    "Phaser",
    "Wah",
    "Slicer",
    "Tremolo/Pan",
    "Chromatic PS",
    "Hyper-Reso",
    "Ring Mod",
    "Crusher",
    "Overdrive",
    "Distortion",
    "Equalizer",
    "Compressor",
    "SX Reverb",
    "SX Delay",
    "Cloud Delay",
    "Back Spin",
    "Isolator",
    "DJFX Looper",
];

const HIGH_BUS_EFFECTS: &[&str] = &[
    OFF,
    "303 VinylSim",
    "404 VinylSim",
    "Cassette Sim",
    "Lo-fi",
    "Downer",
    "Compressor",
    "Equalizer",
    "Isolator",
    "Super Filter",
    "Filter+Drive",
    "WrmSaturator",
    "Overdrive",
    "Distortion",
    "Crusher",
    "Ring Mod",
    "SBF",
    "Resonator",
    "Hyper-Reso",
    "Chromatic PS",
    "Reverb",
    "Ha-Dou",
    "Zan-Zou",
    "Sync Delay",
    "TimeCtrlDly",
    "Ko-Da-Ma",
    "Tape Echo",
    "Chorus",
    "JUNO Chorus",
    "Flanger",
    "Phaser",
    "Wah",
    "Slicer",
    "Tremolo/Pan",
    "To-Gu-Ro",
    "DJFX Looper",
    "Scatter",
    "SX Reverb",
    "SX Delay",
    "Cloud Delay",
];

const INPUT_BUS_EFFECTS: &[&str] = &[
    OFF,
    "Auto Pitch",
    "Vocoder",
    "Harmony",
    "GT Amp Sim",
    "Chorus",
    "JUNO Chorus",
    "Reverb",
    "TimeCtrlDly",
    "Chromatic PS",
    "Downer",
    "WrmSaturator",
    "303 VinylSim",
    "404 VinylSim",
    "Cassette Sim",
    "Lo-fi",
    "Equalizer",
    "Compressor",
];

macro_rules! params {
    ($($name:literal),* $(,)?) => {
        params!(@slots [16, 17, 18, 80, 81, 82] $($name),*)
    };
    (@slots [$($cc:literal),*] $($name:literal),*) => {
        params!(@zip [] [$($cc),*] $($name),*)
    };
    (@zip [$($out:expr),*] [$cc:literal $(, $ccs:literal)*] $name:literal $(, $names:literal)*) => {
        params!(@zip [$($out,)* Parameter { name: $name, cc: $cc }] [$($ccs),*] $($names),*)
    };
    (@zip [$($out:expr),*] [$($ccs:literal),*]) => {
        &[$($out),*]
    };
}

// Direct FX slots and (OFF) have no entry: their knobs are inert.
const PARAMETERS: &[(&str, &[Parameter])] = &[
    ("Filter+Drive", params!["Cutoff", "Resonance", "Drive", "Filter Type", "Low Freq", "Low Gain"]),
    ("Resonator", params!["Root", "Bright", "Feedback", "Chord", "Panning", "Env Mod"]),
    ("Sync Delay", params!["Time", "Feedback", "Level", "L Damp", "H Damp", "Sync"]),
    ("Isolator", params!["Low", "Mid", "High"]),
    ("DJFX Looper", params!["Length", "Speed", "On/Off"]),
    ("Scatter", params!["Type", "Depth", "On/Off", "Speed"]),
    ("Downer", params!["Depth", "Rate", "Filter", "Pitch", "Resonance"]),
    ("Ha-Dou", params!["Mod Depth", "Time", "Level", "Low Cut", "High Cut", "Pre-Delay"]),
    ("Ko-Da-Ma", params!["Time", "Feedback", "Send", "Mode", "Low Cut", "High Cut"]),
    ("Zan-Zou", params!["Time", "Feedback", "Hi Damp", "Level", "Mode", "Sync"]),
    ("To-Gu-Ro", params!["Depth", "Rate", "Resonance", "Time", "Sync"]),
    ("SBF", params!["Interval", "Width", "Type", "Gain", "Sync"]),
    ("Stopper", params!["Speed", "Depth", "On/Off"]),
    ("Tape Echo", params!["Time", "Feedback", "Level", "Wow&Flut", "Sync"]),
    ("TimeCtrlDly", params!["Time", "Feedback", "Level", "Ducking", "L Damp", "Sync"]),
    ("Super Filter", params!["Cutoff", "Resonance", "Type", "Rate", "Depth", "Sync"]),
    ("WrmSaturator", params!["Drive", "Tone", "Color", "Level"]),
    ("303 VinylSim", params!["Comp", "Noise", "Wow&Flut", "Level"]),
    ("404 VinylSim", params!["Frequency", "Noise", "Wow&Flut"]),
    ("Cassette Sim", params!["Tone", "Hiss", "Age", "Drive", "Wow&Flut", "Catch"]),
    ("Lo-fi", params!["Pre Filter", "Lo-Fi Type", "Tone", "Cutoff", "Balance", "Level"]),
    ("Reverb", params!["Time", "Pre-Delay", "Level", "Low Cut", "High Cut", "Density"]),
    ("Chorus", params!["Rate", "Depth", "Level", "Pre-Delay", "Low Cut", "High Cut"]),
    ("JUNO Chorus", params!["Mode", "Noise", "Level"]),
    ("Flanger", params!["Rate", "Depth", "Resonance", "Manual", "Balance", "Sync"]),
    ("Phaser", params!["Rate", "Depth", "Resonance", "Manual", "Balance", "Sync"]),
    ("Wah", params!["Peak", "Rate", "Depth", "Filter Type", "Manual", "Sync"]),
    ("Slicer", params!["Pattern", "Speed", "Depth", "Shuffle", "Mode", "Sync"]),
    ("Tremolo/Pan", params!["Rate", "Depth", "Mode", "Wave", "Sync"]),
    ("Chromatic PS", params!["Pitch1", "Pitch2", "Pan1", "Pan2", "Balance"]),
    ("Hyper-Reso", params!["Note", "Spread", "Character", "Scale", "Feedback", "Env Mod"]),
    ("Ring Mod", params!["Frequency", "Sens", "Balance", "Polarity"]),
    ("Crusher", params!["Filter", "Rate", "Balance"]),
    ("Overdrive", params!["Drive", "Tone", "Level", "Balance"]),
    ("Distortion", params!["Drive", "Tone", "Level", "Balance"]),
    ("Equalizer", params!["Low Gain", "Mid Gain", "High Gain", "Input Gain", "Mid Freq", "Low Freq"]),
    ("Compressor", params!["Sustain", "Attack", "Ratio", "Level"]),
    ("SX Reverb", params!["Time", "Pre-Delay", "Low Cut", "High Cut", "Level", "Density"]),
    ("SX Delay", params!["Time", "Feedback", "Level", "L Damp", "H Damp", "Sync"]),
    ("Cloud Delay", params!["Window", "Pitch", "Feedback", "Density", "Balance", "Level"]),
    ("Back Spin", params!["Length", "Speed", "On/Off"]),
    ("Auto Pitch", params!["Pitch", "Formant", "Balance", "Key", "Robot", "Male/Female"]),
    ("Vocoder", params!["Note", "Formant", "Tone", "Balance", "Level", "Resonance"]),
    ("Harmony", params!["Harmony", "Voice", "Formant", "Key", "Balance"]),
    ("GT Amp Sim", params!["Amp Type", "Drive", "Level", "Bass", "Middle", "Treble"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_categories() {
        assert_eq!(BusCategory::for_bus(0), Some(BusCategory::LowBus));
        assert_eq!(BusCategory::for_bus(1), Some(BusCategory::LowBus));
        assert_eq!(BusCategory::for_bus(2), Some(BusCategory::HighBus));
        assert_eq!(BusCategory::for_bus(3), Some(BusCategory::HighBus));
        assert_eq!(BusCategory::for_bus(4), Some(BusCategory::InputBus));
    }

    #[test]
    fn buses_past_input_have_no_catalog() {
        assert_eq!(BusCategory::for_bus(BUS_COUNT), None);
        assert_eq!(BusCategory::for_bus(9), None);
        assert!(effects_for(9).is_empty());
        assert_eq!(effect_name(9, 1), None);
        assert!(parameters_at(9, 1).is_empty());
        assert_eq!(bus_label(9), "?");
    }

    #[test]
    fn index_zero_is_off_everywhere() {
        for bus in 0..BUS_COUNT {
            assert_eq!(effects_for(bus)[0], OFF);
        }
    }

    #[test]
    fn vinyl_sim_wire_index_on_low_bus() {
        assert_eq!(effect_name(0, 21), Some("303 VinylSim"));
        assert_eq!(index_of(BusCategory::LowBus, "303 VinylSim"), Some(21));
    }

    #[test]
    fn bus_pairs_order_differently() {
        let low = index_of(BusCategory::LowBus, "Compressor");
        let high = index_of(BusCategory::HighBus, "Compressor");
        assert!(low.is_some() && high.is_some());
        assert_ne!(low, high);
    }

    #[test]
    fn input_catalog_is_smaller() {
        assert!(effects_for(4).len() < effects_for(0).len());
        assert_eq!(effect_name(4, 3), Some("Harmony"));
    }

    #[test]
    fn every_catalog_effect_has_at_most_six_params() {
        for bus in 0..BUS_COUNT {
            for name in effects_for(bus) {
                assert!(parameters_for(name).len() <= KNOB_COUNT, "{name}");
            }
        }
    }

    #[test]
    fn params_use_ctrl_ccs_by_slot() {
        let params = parameters_for("303 VinylSim");
        assert_eq!(params.len(), 4);
        assert_eq!(params[0], Parameter { name: "Comp", cc: 16 });
        assert_eq!(params[3], Parameter { name: "Level", cc: 80 });
    }

    #[test]
    fn unknown_lookups_are_empty() {
        assert!(parameters_for("No Such FX").is_empty());
        assert!(parameters_for(OFF).is_empty());
        assert!(parameters_at(0, 999).is_empty());
        assert_eq!(effect_name(4, 999), None);
    }

    #[test]
    fn fallback_cc_uses_ctrl_table() {
        let params = parameters_for("Crusher");
        assert_eq!(cc_for(params, 1), 17);
        assert_eq!(cc_for(params, 4), 81);
        assert_eq!(cc_for(&[], 5), 82);
    }

    #[test]
    fn labels() {
        assert_eq!(bus_label(0), "BUS 1");
        assert_eq!(bus_label(4), "INPUT");
        assert_eq!(bus_label(9), "?");
    }
}
