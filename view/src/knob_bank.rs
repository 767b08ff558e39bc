use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::{put_char, put_str};

const MAX_VALUE: u16 = 127;

/// One column of the bank.
pub struct Knob<'a> {
    pub label: &'a str,
    pub value: u8,
}

/// A row of vertical faders, one per knob.
///
/// Each column has the parameter name on top, the bar in the middle and
/// the numeric value underneath. The focused column is highlighted.
/// Dragging inside a column maps the row to a 0-127 value with
/// [`KnobBank::value_at`].
pub struct KnobBank<'a> {
    knobs: &'a [Knob<'a>],
    focused: Option<usize>,
    bar_style: Style,
    focus_style: Style,
}

impl<'a> KnobBank<'a> {
    pub fn new(knobs: &'a [Knob<'a>], focused: Option<usize>) -> Self {
        Self {
            knobs,
            focused,
            bar_style: Style::default().fg(Color::Cyan),
            focus_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn column(area: Rect, count: usize, index: usize) -> Rect {
        let width = area.width / count.max(1) as u16;
        Rect::new(area.x + width * index as u16, area.y, width, area.height)
    }

    fn track(area: Rect) -> Option<(u16, u16)> {
        // Label row on top, value row below.
        if area.height < 3 {
            return None;
        }
        Some((area.y + 1, area.height - 2))
    }

    /// Column under `x` for a bank of `count` knobs rendered into `area`.
    pub fn knob_at(x: u16, y: u16, area: Rect, count: usize) -> Option<usize> {
        if count == 0 || y < area.y || y >= area.bottom() || x < area.x {
            return None;
        }
        let width = (area.width / count as u16).max(1);
        let index = ((x - area.x) / width) as usize;
        (index < count).then_some(index)
    }

    /// Value for a pointer at row `y`: the top of the track is 127, the bottom 0.
    /// Rows above or below the track clamp to the ends.
    pub fn value_at(y: u16, area: Rect) -> Option<u8> {
        let (top, height) = Self::track(area)?;
        if height <= 1 {
            return Some(MAX_VALUE as u8);
        }
        let rel = y.clamp(top, top + height - 1) - top;
        let from_bottom = height - 1 - rel;
        let value = (from_bottom * MAX_VALUE + (height - 1) / 2) / (height - 1);
        Some(value as u8)
    }
}

impl Widget for KnobBank<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((top, height)) = Self::track(area) else {
            return;
        };
        let count = self.knobs.len();
        for (index, knob) in self.knobs.iter().enumerate() {
            let col = Self::column(area, count, index);
            if col.width < 2 {
                continue;
            }
            let focused = self.focused == Some(index);
            let text_style = if focused {
                self.focus_style
            } else {
                Style::default()
            };
            let right = col.right() - 1;

            put_str(buf, col.x, area.y, right, knob.label, text_style);

            let filled = (knob.value as u16 * height + MAX_VALUE / 2) / MAX_VALUE;
            let bar_x = col.x + (col.width - 1) / 2;
            for row in 0..height {
                let y = top + height - 1 - row;
                if row < filled {
                    put_char(buf, bar_x, y, '█', if focused { self.focus_style } else { self.bar_style });
                } else {
                    put_char(buf, bar_x, y, '│', Style::default().fg(Color::DarkGray));
                }
            }

            let value = format!("{:>3}", knob.value);
            let value_x = bar_x.saturating_sub(1).max(col.x);
            put_str(buf, value_x, area.bottom() - 1, right, &value, text_style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_split_width_evenly() {
        let area = Rect::new(10, 0, 60, 12);
        assert_eq!(KnobBank::knob_at(10, 5, area, 6), Some(0));
        assert_eq!(KnobBank::knob_at(29, 5, area, 6), Some(1));
        assert_eq!(KnobBank::knob_at(69, 5, area, 6), Some(5));
        assert_eq!(KnobBank::knob_at(70, 5, area, 6), None);
        assert_eq!(KnobBank::knob_at(9, 5, area, 6), None);
        assert_eq!(KnobBank::knob_at(20, 12, area, 6), None);
    }

    #[test]
    fn track_spans_full_range() {
        // Track rows are 1..=10.
        let area = Rect::new(0, 0, 60, 12);
        assert_eq!(KnobBank::value_at(1, area), Some(127));
        assert_eq!(KnobBank::value_at(10, area), Some(0));
        assert_eq!(KnobBank::value_at(0, area), Some(127));
        assert_eq!(KnobBank::value_at(11, area), Some(0));
        let mid = KnobBank::value_at(5, area).unwrap();
        assert!((60..=75).contains(&mid), "mid = {mid}");
    }

    #[test]
    fn too_small_area_has_no_track() {
        assert_eq!(KnobBank::value_at(0, Rect::new(0, 0, 10, 2)), None);
    }

    #[test]
    fn render_fills_bar_from_bottom() {
        let knobs = [
            Knob { label: "Time", value: 127 },
            Knob { label: "Fbk", value: 0 },
        ];
        let area = Rect::new(0, 0, 10, 6);
        let mut buf = Buffer::empty(area);
        KnobBank::new(&knobs, Some(0)).render(area, &mut buf);
        // Column 0 spans x 0..5, bar at x 2.
        assert_eq!(buf[(2, 1)].symbol(), "█");
        assert_eq!(buf[(2, 4)].symbol(), "█");
        // Column 1 spans x 5..10, bar at x 7, empty.
        assert_eq!(buf[(7, 4)].symbol(), "│");
        assert_eq!(buf[(0, 0)].symbol(), "T");
    }
}
