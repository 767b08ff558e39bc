use std::collections::HashSet;

use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

/// Raw short message as received from an input port.
pub type RawEvent = [u8; 3];

/// A Control Change message addressed to one bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcMessage {
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl CcMessage {
    /// The bus index doubles as the MIDI channel.
    pub fn new(bus: usize, controller: u8, value: u8) -> Self {
        CcMessage {
            channel: (bus & 0x0F) as u8,
            controller: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [0xB0 + self.channel, self.controller, self.value]
    }
}

/// Outbound side of the device link. Sends are fire-and-forget.
pub trait Transport {
    fn send(&mut self, message: CcMessage);

    fn is_connected(&self) -> bool {
        true
    }
}

/// Collects messages instead of sending them.
impl Transport for Vec<CcMessage> {
    fn send(&mut self, message: CcMessage) {
        self.push(message);
    }
}

/// midir output bound to the first port whose name matches the device filter.
/// Without a port every send is a logged no-op.
pub struct MidiOut {
    connection: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidiOut {
    pub fn offline() -> Self {
        MidiOut {
            connection: None,
            port_name: None,
        }
    }

    /// Bind to the first output port containing `filter`. A missing device is
    /// reported once here; the returned transport stays usable offline.
    pub fn connect(filter: &str, client_name: &str) -> Self {
        let midi_out = match MidiOutput::new(client_name) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("MIDI output unavailable: {e}");
                return Self::offline();
            }
        };

        let port = midi_out.ports().into_iter().find_map(|port| {
            let name = midi_out.port_name(&port).ok()?;
            name.contains(filter).then_some((port, name))
        });

        let Some((port, name)) = port else {
            log::warn!("No MIDI output matching '{filter}' — running offline");
            return Self::offline();
        };

        match midi_out.connect(&port, client_name) {
            Ok(conn) => {
                log::info!("Opened MIDI output: {name}");
                MidiOut {
                    connection: Some(conn),
                    port_name: Some(name),
                }
            }
            Err(e) => {
                log::warn!("Failed to open MIDI output {name}: {e}");
                Self::offline()
            }
        }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }
}

impl Transport for MidiOut {
    fn send(&mut self, message: CcMessage) {
        let bytes = message.to_bytes();
        match self.connection.as_mut() {
            Some(conn) => {
                if let Err(e) = conn.send(&bytes) {
                    log::warn!("MIDI send failed: {e}");
                }
            }
            None => log::debug!(
                "(offline) CC ch={} cc={} value={}",
                message.channel + 1,
                message.controller,
                message.value
            ),
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

pub fn list_outputs(client_name: &str) -> anyhow::Result<Vec<String>> {
    let midi_out = MidiOutput::new(client_name)?;
    Ok(midi_out
        .ports()
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".into()))
        .collect())
}

pub fn list_inputs(client_name: &str) -> anyhow::Result<Vec<String>> {
    let midi_in = MidiInput::new(client_name)?;
    Ok(midi_in
        .ports()
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_else(|_| "Unknown".into()))
        .collect())
}

/// Listens on the device's input ports and forwards short messages over a
/// channel, for the pad monitor.
pub struct PadListener {
    sender: Sender<RawEvent>,
    device_filter: String,
    client_name: String,
    connections: Vec<MidiInputConnection<()>>,
    connected_names: HashSet<String>,
}

impl PadListener {
    pub fn new(sender: Sender<RawEvent>, device_filter: &str, client_name: &str) -> Self {
        PadListener {
            sender,
            device_filter: device_filter.to_string(),
            client_name: client_name.to_string(),
            connections: Vec::new(),
            connected_names: HashSet::new(),
        }
    }

    /// Open matching input ports that are not open yet.
    /// Returns the number of newly opened connections.
    pub fn open_ports(&mut self) -> anyhow::Result<usize> {
        let midi_in = MidiInput::new(&self.client_name)?;
        let mut opened = 0;

        for port in &midi_in.ports() {
            let Ok(name) = midi_in.port_name(port) else {
                continue;
            };
            if self.connected_names.contains(&name) || !name.contains(self.device_filter.as_str()) {
                continue;
            }

            let sender = self.sender.clone();
            let log_name = name.clone();

            // Each connection consumes its MidiInput.
            let port_in = MidiInput::new(&self.client_name)?;
            match port_in.connect(
                port,
                &name,
                move |_timestamp_us, bytes, _| {
                    // Short messages only; SysEx and clock bytes are dropped.
                    if bytes.len() != 3 {
                        return;
                    }
                    log::debug!("MIDI in [{log_name}] data={bytes:02x?}");
                    if sender.try_send([bytes[0], bytes[1], bytes[2]]).is_err() {
                        log::warn!("Pad channel full — dropping event from {log_name}");
                    }
                },
                (),
            ) {
                Ok(conn) => {
                    log::info!("Opened MIDI input: {name}");
                    self.connected_names.insert(name);
                    self.connections.push(conn);
                    opened += 1;
                }
                Err(e) => log::warn!("Failed to open MIDI input {name}: {e}"),
            }
        }

        Ok(opened)
    }

    /// Pick up a device plugged in after startup. Call periodically.
    pub fn poll_new_devices(&mut self) {
        match self.open_ports() {
            Ok(0) => {}
            Ok(n) => log::info!("Opened {n} new MIDI input(s)"),
            Err(e) => log::warn!("MIDI poll error: {e}"),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_byte_carries_bus_as_channel() {
        assert_eq!(CcMessage::new(0, 83, 21).to_bytes(), [0xB0, 83, 21]);
        assert_eq!(CcMessage::new(4, 16, 127).to_bytes(), [0xB4, 16, 127]);
    }

    #[test]
    fn data_bytes_stay_seven_bit() {
        let msg = CcMessage::new(3, 0xFF, 0x80);
        assert_eq!(msg.to_bytes(), [0xB3, 0x7F, 0x00]);
    }

    #[test]
    fn offline_output_swallows_sends() {
        let mut out = MidiOut::offline();
        assert!(!out.is_connected());
        out.send(CcMessage::new(0, 83, 1));
        assert_eq!(out.port_name(), None);
    }

    #[test]
    fn vec_records_in_order() {
        let mut sent: Vec<CcMessage> = Vec::new();
        sent.send(CcMessage::new(1, 83, 5));
        sent.send(CcMessage::new(1, 16, 9));
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].controller, 83);
        assert!(sent.is_connected());
    }
}
