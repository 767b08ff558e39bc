use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::{put_char, put_str};

const MAX: u32 = 127;

fn scale(rel: u16, span: u16) -> u8 {
    if span <= 1 {
        return 0;
    }
    let span = (span - 1) as u32;
    ((rel.min(span as u16) as u32 * MAX + span / 2) / span) as u8
}

fn unscale(value: u8, span: u16) -> u16 {
    if span <= 1 {
        return 0;
    }
    let span = (span - 1) as u32;
    ((value as u32 * span + MAX / 2) / MAX) as u16
}

/// Two-axis touch surface driving the first two knobs.
///
/// Position (x, y) in the area maps linearly to 0-127 on both axes.
/// With `invert_y` the top row is 127, which is how the hardware pad feels.
pub struct XyPad<'a> {
    x: u8,
    y: u8,
    invert_y: bool,
    x_label: &'a str,
    y_label: &'a str,
    active: bool,
}

impl<'a> XyPad<'a> {
    pub fn new(x: u8, y: u8, invert_y: bool) -> Self {
        Self {
            x,
            y,
            invert_y,
            x_label: "",
            y_label: "",
            active: false,
        }
    }

    pub fn labels(mut self, x_label: &'a str, y_label: &'a str) -> Self {
        self.x_label = x_label;
        self.y_label = y_label;
        self
    }

    /// Draw the puck highlighted (while being dragged).
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Values for the terminal cell (col, row). Points outside `area`
    /// clamp to the nearest edge so a drag can leave the pad.
    pub fn values_at(col: u16, row: u16, area: Rect, invert_y: bool) -> (u8, u8) {
        let rel_x = col.saturating_sub(area.x);
        let rel_y = row.saturating_sub(area.y);
        let x = scale(rel_x, area.width);
        let down = scale(rel_y, area.height);
        let y = if invert_y { MAX as u8 - down } else { down };
        (x, y)
    }

    /// Terminal cell for a value pair, the inverse of [`XyPad::values_at`].
    pub fn cell_for(x: u8, y: u8, area: Rect, invert_y: bool) -> (u16, u16) {
        let down = if invert_y { MAX as u8 - y.min(MAX as u8) } else { y };
        (
            area.x + unscale(x.min(MAX as u8), area.width),
            area.y + unscale(down.min(MAX as u8), area.height),
        )
    }
}

impl Widget for XyPad<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let grid = Style::default().fg(Color::DarkGray);
        let (px, py) = Self::cell_for(self.x, self.y, area, self.invert_y);

        for row in area.y..area.bottom() {
            for col in area.x..area.right() {
                let ch = if col == px && row == py {
                    continue;
                } else if col == px {
                    '┆'
                } else if row == py {
                    '┄'
                } else if (col - area.x) % 4 == 0 && (row - area.y) % 2 == 0 {
                    '·'
                } else {
                    ' '
                };
                put_char(buf, col, row, ch, grid);
            }
        }

        let puck_style = if self.active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        put_char(buf, px, py, '●', puck_style);

        let label_style = Style::default().fg(Color::Gray);
        let x_text = format!("{} {}", self.x_label, self.x);
        let y_text = format!("{} {}", self.y_label, self.y);
        let bottom = area.bottom() - 1;
        let start = area.right().saturating_sub(x_text.chars().count() as u16);
        put_str(buf, start.max(area.x), bottom, area.right(), &x_text, label_style);
        put_str(buf, area.x, area.y, area.right(), &y_text, label_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_extremes() {
        let area = Rect::new(5, 2, 33, 17);
        assert_eq!(XyPad::values_at(5, 2, area, true), (0, 127));
        assert_eq!(XyPad::values_at(37, 18, area, true), (127, 0));
        assert_eq!(XyPad::values_at(5, 2, area, false), (0, 0));
        assert_eq!(XyPad::values_at(37, 18, area, false), (127, 127));
    }

    #[test]
    fn centre_maps_near_midpoint() {
        let area = Rect::new(0, 0, 33, 17);
        let (x, y) = XyPad::values_at(16, 8, area, true);
        assert!((62..=65).contains(&x), "x = {x}");
        assert!((62..=65).contains(&y), "y = {y}");
    }

    #[test]
    fn drag_outside_clamps_to_edges() {
        let area = Rect::new(10, 10, 20, 10);
        assert_eq!(XyPad::values_at(0, 0, area, true), (0, 127));
        assert_eq!(XyPad::values_at(200, 200, area, true), (127, 0));
    }

    #[test]
    fn cell_for_inverts_values_at() {
        let area = Rect::new(3, 4, 33, 17);
        for &(col, row) in &[(3, 4), (35, 20), (19, 12), (10, 7)] {
            let (x, y) = XyPad::values_at(col, row, area, true);
            assert_eq!(XyPad::cell_for(x, y, area, true), (col, row));
        }
    }

    #[test]
    fn puck_drawn_at_value_position() {
        let area = Rect::new(0, 0, 9, 5);
        let mut buf = Buffer::empty(area);
        XyPad::new(127, 127, true).render(area, &mut buf);
        assert_eq!(buf[(8, 0)].symbol(), "●");
    }
}
