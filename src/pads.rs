//! Maps incoming pad notes onto the device's 4x4 pad grid.

use crate::midi::RawEvent;

/// Note of the bottom-left pad; the grid covers 16 notes from here.
pub const FIRST_PAD_NOTE: u8 = 36;
pub const GRID_SIZE: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadCell {
    pub col: u8,
    pub row: u8,
}

impl PadCell {
    /// Pad number 1..=16 as printed on the device.
    pub fn number(self) -> u8 {
        self.row * GRID_SIZE + self.col + 1
    }
}

/// Grid cell for a note-on, or `None` for releases and notes off the grid.
pub fn pad_cell(note: u8, velocity: u8) -> Option<PadCell> {
    let last = FIRST_PAD_NOTE + GRID_SIZE * GRID_SIZE - 1;
    if velocity == 0 || !(FIRST_PAD_NOTE..=last).contains(&note) {
        return None;
    }
    let n = note - FIRST_PAD_NOTE;
    Some(PadCell {
        col: n % GRID_SIZE,
        row: n / GRID_SIZE,
    })
}

/// Decode a raw input event; anything but a note-on is ignored.
pub fn decode(event: RawEvent) -> Option<PadCell> {
    let [status, note, velocity] = event;
    if status & 0xF0 != 0x90 {
        return None;
    }
    pad_cell(note, velocity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        assert_eq!(pad_cell(36, 100), Some(PadCell { col: 0, row: 0 }));
        assert_eq!(pad_cell(39, 100), Some(PadCell { col: 3, row: 0 }));
        assert_eq!(pad_cell(48, 1), Some(PadCell { col: 0, row: 3 }));
        assert_eq!(pad_cell(51, 127), Some(PadCell { col: 3, row: 3 }));
    }

    #[test]
    fn outside_grid_or_release() {
        assert_eq!(pad_cell(35, 100), None);
        assert_eq!(pad_cell(52, 100), None);
        assert_eq!(pad_cell(40, 0), None);
    }

    #[test]
    fn pad_numbers() {
        assert_eq!(pad_cell(36, 1).map(PadCell::number), Some(1));
        assert_eq!(pad_cell(45, 1).map(PadCell::number), Some(10));
    }

    #[test]
    fn decode_only_note_on() {
        assert_eq!(decode([0x90, 41, 64]), Some(PadCell { col: 1, row: 1 }));
        assert_eq!(decode([0x9A, 36, 64]), Some(PadCell { col: 0, row: 0 }));
        assert_eq!(decode([0x80, 41, 64]), None);
        assert_eq!(decode([0xB0, 41, 64]), None);
    }
}
