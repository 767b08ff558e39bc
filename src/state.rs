use serde::Serialize;

use crate::catalog::{BUS_COUNT, KNOB_COUNT};

/// Knob value used for fresh buses and padded snapshot slots.
pub const DEFAULT_KNOB_VALUE: u8 = 63;

/// Effect index of a fresh bus: the first real effect, not `(OFF)`.
pub const DEFAULT_EFFECT_INDEX: usize = 1;

pub const IDENTITY_MAPPING: [u8; KNOB_COUNT] = [0, 1, 2, 3, 4, 5];

/// Clamp an untrusted value into the MIDI data range.
pub fn clamp_value(value: i32) -> u8 {
    value.clamp(0, 127) as u8
}

/// Per-bus state: the active effect, the six parameter-slot values and the
/// physical knob → parameter slot mapping.
///
/// `knobs` is indexed by parameter slot, not by physical knob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusState {
    pub effect_index: usize,
    pub knobs: [u8; KNOB_COUNT],
    pub mappings: [u8; KNOB_COUNT],
}

impl Default for BusState {
    fn default() -> Self {
        BusState {
            effect_index: DEFAULT_EFFECT_INDEX,
            knobs: [DEFAULT_KNOB_VALUE; KNOB_COUNT],
            mappings: IDENTITY_MAPPING,
        }
    }
}

impl BusState {
    /// Parameter slot driven by physical knob `knob`.
    pub fn slot_for(&self, knob: usize) -> usize {
        self.mappings[knob] as usize % KNOB_COUNT
    }

    /// Value shown on physical knob `knob`.
    pub fn knob_value(&self, knob: usize) -> u8 {
        self.knobs[self.slot_for(knob)]
    }

    pub fn reset_mappings(&mut self) {
        self.mappings = IDENTITY_MAPPING;
    }
}

/// The full surface: four effect buses followed by the input bus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    pub buses: [BusState; BUS_COUNT],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_bus_defaults() {
        let bus = BusState::default();
        assert_eq!(bus.effect_index, 1);
        assert_eq!(bus.knobs, [63; 6]);
        assert_eq!(bus.mappings, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn fresh_controller_has_five_buses() {
        let state = ControllerState::default();
        assert_eq!(state.buses.len(), 5);
        assert!(state.buses.iter().all(|b| *b == BusState::default()));
    }

    #[test]
    fn clamping() {
        assert_eq!(clamp_value(-10), 0);
        assert_eq!(clamp_value(500), 127);
        assert_eq!(clamp_value(64), 64);
    }

    #[test]
    fn knob_value_follows_mapping() {
        let mut bus = BusState::default();
        bus.knobs[4] = 90;
        bus.mappings[2] = 4;
        assert_eq!(bus.slot_for(2), 4);
        assert_eq!(bus.knob_value(2), 90);
        bus.reset_mappings();
        assert_eq!(bus.knob_value(2), 63);
    }

    #[test]
    fn serializes_in_document_shape() {
        let json = serde_json::to_value(BusState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "effectIndex": 1,
                "knobs": [63, 63, 63, 63, 63, 63],
                "mappings": [0, 1, 2, 3, 4, 5],
            })
        );
    }
}
