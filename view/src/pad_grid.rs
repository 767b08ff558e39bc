use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::put_str;

pub const SIZE: u16 = 4;

/// 4x4 pad map with the most recent hit lit. Pad 1 is bottom-left,
/// matching the layout on the device.
pub struct PadGrid {
    lit: Option<(u8, u8)>,
}

impl PadGrid {
    /// `lit` is the (col, row) of the last pad hit, if any.
    pub fn new(lit: Option<(u8, u8)>) -> Self {
        Self { lit }
    }
}

impl Widget for PadGrid {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cell_w = area.width / SIZE;
        if cell_w < 3 || area.height < SIZE {
            return;
        }
        let cell_h = area.height / SIZE;
        for row in 0..SIZE {
            for col in 0..SIZE {
                let number = row * SIZE + col + 1;
                let lit = self.lit == Some((col as u8, row as u8));
                let style = if lit {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let x = area.x + col * cell_w;
                let y = area.y + (SIZE - 1 - row) * cell_h + cell_h / 2;
                let text = format!("{:^width$}", number, width = (cell_w - 1) as usize);
                put_str(buf, x, y, x + cell_w - 1, &text, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_pad_is_highlighted() {
        let area = Rect::new(0, 0, 16, 4);
        let mut buf = Buffer::empty(area);
        PadGrid::new(Some((1, 2))).render(area, &mut buf);
        // Pad 10 sits at col 1, row 2: x 4..7, second screen row from the top.
        assert_eq!(buf[(4, 1)].symbol(), "1");
        assert_eq!(buf[(5, 1)].symbol(), "0");
        assert_eq!(buf[(4, 1)].style().bg, Some(Color::Yellow));
        // Pad 1 is on the bottom screen row.
        assert_eq!(buf[(1, 3)].symbol(), "1");
        assert_ne!(buf[(1, 3)].style().bg, Some(Color::Yellow));
    }
}
