//! On-disk preset document and migration of older entry shapes.
//!
//! The document is a flat JSON object `name -> entry`. Two entry shapes exist:
//!
//! - current: `{ "description": "...", "state": { "buses": [...] } }`, buses
//!   carry `effectIndex`, `knobs` and `mappings`
//! - legacy: the bus array directly (`{ "buses": [...] }`), no description,
//!   no `mappings`
//!
//! Entries are read leniently and lifted into the current shape; writes only
//! ever produce the current shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{self, BUS_COUNT, KNOB_COUNT};
use crate::state::{
    BusState, ControllerState, DEFAULT_EFFECT_INDEX, DEFAULT_KNOB_VALUE, IDENTITY_MAPPING, clamp_value,
};

use super::Preset;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryShape {
    Legacy,
    Current,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Current {
        #[serde(default)]
        description: String,
        state: StoredState,
    },
    Legacy(StoredState),
}

#[derive(Deserialize)]
struct StoredState {
    buses: Vec<StoredBus>,
}

#[derive(Deserialize)]
struct StoredBus {
    #[serde(rename = "effectIndex")]
    effect_index: i64,
    #[serde(default)]
    knobs: Vec<i64>,
    #[serde(default)]
    mappings: Option<Vec<i64>>,
}

#[derive(Serialize)]
struct PersistedEntry<'a> {
    description: &'a str,
    state: &'a ControllerState,
}

/// Parse one document entry into a preset, reporting which shape it had.
pub fn migrate_entry(name: &str, value: Value) -> Result<(Preset, EntryShape), serde_json::Error> {
    let entry: StoredEntry = serde_json::from_value(value)?;
    let (description, stored, shape) = match entry {
        StoredEntry::Current { description, state } => (description, state, EntryShape::Current),
        StoredEntry::Legacy(state) => (String::new(), state, EntryShape::Legacy),
    };
    if stored.buses.len() != BUS_COUNT {
        log::warn!(
            "Preset '{name}' has {} buses, expected {BUS_COUNT}; padding/truncating",
            stored.buses.len()
        );
    }

    let mut state = ControllerState::default();
    for (index, (slot, bus)) in state.buses.iter_mut().zip(stored.buses).enumerate() {
        *slot = lift_bus(name, index, bus);
    }
    Ok((Preset { description, state }, shape))
}

fn lift_bus(name: &str, index: usize, stored: StoredBus) -> BusState {
    let effects = catalog::effects_for(index).len();
    let effect_index = match usize::try_from(stored.effect_index) {
        Ok(i) if i < effects => i,
        _ => {
            log::warn!(
                "Preset '{name}': {} has no effect {}, using {DEFAULT_EFFECT_INDEX}",
                catalog::bus_label(index),
                stored.effect_index
            );
            DEFAULT_EFFECT_INDEX
        }
    };
    let mut bus = BusState {
        effect_index,
        ..BusState::default()
    };

    for (slot, value) in bus.knobs.iter_mut().zip(&stored.knobs) {
        *slot = clamp_value((*value).clamp(i32::MIN as i64, i32::MAX as i64) as i32);
    }
    if stored.knobs.len() != KNOB_COUNT {
        log::debug!(
            "Preset '{name}': {} knob values, missing slots set to {DEFAULT_KNOB_VALUE}",
            stored.knobs.len()
        );
    }

    if let Some(mappings) = stored.mappings {
        let valid = mappings.len() == KNOB_COUNT
            && mappings.iter().all(|m| (0..KNOB_COUNT as i64).contains(m));
        if valid {
            for (slot, m) in bus.mappings.iter_mut().zip(mappings) {
                *slot = m as u8;
            }
        } else {
            log::warn!("Preset '{name}': invalid knob mapping {mappings:?}, using identity");
            bus.mappings = IDENTITY_MAPPING;
        }
    }
    bus
}

/// Parse a whole document. Entries that fail to parse are skipped with a
/// warning so one damaged preset does not hide the rest.
pub fn parse_document(text: &str) -> Result<Vec<(String, Preset)>, serde_json::Error> {
    let doc: Map<String, Value> = serde_json::from_str(text)?;
    let mut presets = Vec::with_capacity(doc.len());
    let mut legacy = 0;
    for (name, value) in doc {
        match migrate_entry(&name, value) {
            Ok((preset, shape)) => {
                if shape == EntryShape::Legacy {
                    legacy += 1;
                }
                presets.push((name, preset));
            }
            Err(e) => log::warn!("Skipping unreadable preset '{name}': {e}"),
        }
    }
    if legacy > 0 {
        log::info!("Migrated {legacy} legacy preset(s) to the current format");
    }
    Ok(presets)
}

/// Render presets as a document, in the given order.
pub fn render_document(presets: &[(String, Preset)]) -> Result<String, serde_json::Error> {
    let mut doc = Map::new();
    for (name, preset) in presets {
        let entry = PersistedEntry {
            description: &preset.description,
            state: &preset.state,
        };
        doc.insert(name.clone(), serde_json::to_value(entry)?);
    }
    serde_json::to_string_pretty(&doc)
}
