use crate::catalog::{self, BUS_COUNT, EFX_SELECT_CC, INERT_LABEL, KNOB_COUNT, Parameter};
use crate::midi::{CcMessage, Transport};
use crate::state::{BusState, ControllerState, DEFAULT_EFFECT_INDEX, clamp_value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("no bus {0} (expected 0-{max})", max = BUS_COUNT - 1)]
    NoSuchBus(usize),

    #[error("no knob {0} (expected 0-{max})", max = KNOB_COUNT - 1)]
    NoSuchKnob(usize),

    #[error("{bus_label} has no effect {index}")]
    NoSuchEffect { bus_label: &'static str, index: usize },

    #[error("no parameter slot {0} (expected 0-{max})", max = KNOB_COUNT - 1)]
    NoSuchSlot(usize),
}

/// Owns the live surface state and pushes every change to the transport.
pub struct Controller<T> {
    state: ControllerState,
    selected_bus: usize,
    transport: T,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T) -> Self {
        Controller {
            state: ControllerState::default(),
            selected_bus: 0,
            transport,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn bus(&self, bus: usize) -> Result<&BusState, ControlError> {
        self.state.buses.get(bus).ok_or(ControlError::NoSuchBus(bus))
    }

    pub fn selected_bus(&self) -> usize {
        self.selected_bus
    }

    pub fn select_bus(&mut self, bus: usize) -> Result<(), ControlError> {
        self.bus(bus)?;
        self.selected_bus = bus;
        Ok(())
    }

    /// Catalog parameters of the effect active on `bus`.
    pub fn parameters(&self, bus: usize) -> &'static [Parameter] {
        match self.state.buses.get(bus) {
            Some(b) => catalog::parameters_at(bus, b.effect_index),
            None => &[],
        }
    }

    pub fn effect_name(&self, bus: usize) -> Option<&'static str> {
        let b = self.state.buses.get(bus)?;
        catalog::effect_name(bus, b.effect_index)
    }

    /// Switch the effect on `bus`. The knob mapping goes back to identity.
    pub fn select_effect(&mut self, bus: usize, effect_index: usize) -> Result<(), ControlError> {
        self.bus(bus)?;
        if catalog::effect_name(bus, effect_index).is_none() {
            return Err(ControlError::NoSuchEffect {
                bus_label: catalog::bus_label(bus),
                index: effect_index,
            });
        }
        let b = &mut self.state.buses[bus];
        b.effect_index = effect_index;
        b.reset_mappings();
        self.transport
            .send(CcMessage::new(bus, EFX_SELECT_CC, effect_index as u8));
        Ok(())
    }

    /// Move physical knob `knob` to `value` (clamped). Writes the parameter
    /// slot the knob is mapped to and transmits that slot's CC.
    pub fn set_knob(&mut self, bus: usize, knob: usize, value: i32) -> Result<(), ControlError> {
        self.bus(bus)?;
        if knob >= KNOB_COUNT {
            return Err(ControlError::NoSuchKnob(knob));
        }
        let value = clamp_value(value);
        let slot = self.state.buses[bus].slot_for(knob);
        self.state.buses[bus].knobs[slot] = value;
        let cc = catalog::cc_for(self.parameters(bus), slot);
        self.transport.send(CcMessage::new(bus, cc, value));
        Ok(())
    }

    /// X/Y pad: X drives whatever knob 1 maps to, Y whatever knob 2 maps to.
    /// X is sent first.
    pub fn set_xy(&mut self, bus: usize, x: i32, y: i32) -> Result<(), ControlError> {
        self.set_knob(bus, 0, x)?;
        self.set_knob(bus, 1, y)
    }

    /// Point physical knob `knob` at parameter `slot`. Nothing is sent.
    pub fn remap_knob(&mut self, bus: usize, knob: usize, slot: usize) -> Result<(), ControlError> {
        self.bus(bus)?;
        if knob >= KNOB_COUNT {
            return Err(ControlError::NoSuchKnob(knob));
        }
        if slot >= KNOB_COUNT {
            return Err(ControlError::NoSuchSlot(slot));
        }
        self.state.buses[bus].mappings[knob] = slot as u8;
        Ok(())
    }

    /// Parameter name currently behind physical knob `knob`.
    pub fn label_for(&self, bus: usize, knob: usize) -> &'static str {
        let Some(b) = self.state.buses.get(bus) else {
            return INERT_LABEL;
        };
        if knob >= KNOB_COUNT {
            return INERT_LABEL;
        }
        self.parameters(bus)
            .get(b.slot_for(knob))
            .map_or(INERT_LABEL, |p| p.name)
    }

    pub fn xy_labels(&self, bus: usize) -> (&'static str, &'static str) {
        (self.label_for(bus, 0), self.label_for(bus, 1))
    }

    /// Replace the live state with `state` and replay it: per bus, effect
    /// select first and then all six slot values, bus 1 through input.
    /// An effect index the bus catalog lacks is replaced by the default.
    pub fn recall(&mut self, state: &ControllerState) {
        self.state = state.clone();
        for (bus, b) in self.state.buses.iter_mut().enumerate() {
            if catalog::effect_name(bus, b.effect_index).is_none() {
                log::warn!(
                    "{} has no effect {}, recalling {DEFAULT_EFFECT_INDEX}",
                    catalog::bus_label(bus),
                    b.effect_index
                );
                b.effect_index = DEFAULT_EFFECT_INDEX;
            }
        }
        for (bus, b) in self.state.buses.iter().enumerate() {
            // Catalog indices are below 128.
            let select = u8::try_from(b.effect_index).unwrap_or(DEFAULT_EFFECT_INDEX as u8);
            self.transport
                .send(CcMessage::new(bus, EFX_SELECT_CC, select));
            let params = catalog::parameters_at(bus, b.effect_index);
            for (slot, &value) in b.knobs.iter().enumerate() {
                let cc = catalog::cc_for(params, slot);
                self.transport.send(CcMessage::new(bus, cc, value));
            }
        }
    }

    /// One raw CC on `bus`, bypassing the catalog.
    pub fn send_raw(&mut self, bus: usize, cc: i32, value: i32) -> Result<(), ControlError> {
        self.bus(bus)?;
        self.transport
            .send(CcMessage::new(bus, clamp_value(cc), clamp_value(value)));
        Ok(())
    }

    // Selected-bus conveniences for the surface.

    pub fn select_effect_here(&mut self, effect_index: usize) -> Result<(), ControlError> {
        self.select_effect(self.selected_bus, effect_index)
    }

    pub fn set_knob_here(&mut self, knob: usize, value: i32) -> Result<(), ControlError> {
        self.set_knob(self.selected_bus, knob, value)
    }

    pub fn set_xy_here(&mut self, x: i32, y: i32) -> Result<(), ControlError> {
        self.set_xy(self.selected_bus, x, y)
    }

    pub fn remap_knob_here(&mut self, knob: usize, slot: usize) -> Result<(), ControlError> {
        self.remap_knob(self.selected_bus, knob, slot)
    }
}
