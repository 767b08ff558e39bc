use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use crate::paint::scrollbar;

/// Vertically scrolled block of text lines (the help page).
pub struct ScrollView<'a> {
    lines: &'a [Line<'a>],
    offset: usize,
}

impl<'a> ScrollView<'a> {
    pub fn new(lines: &'a [Line<'a>], offset: usize) -> Self {
        Self { lines, offset }
    }

    /// Largest useful offset for `total` lines in a viewport of `height`.
    pub fn clamp_offset(offset: usize, total: usize, height: usize) -> usize {
        offset.min(total.saturating_sub(height))
    }

    /// Offset for a click on the scrollbar column at row `y`.
    pub fn offset_from_scrollbar(y: u16, area: Rect, total: usize) -> usize {
        let visible = area.height as usize;
        if total <= visible || visible <= 1 {
            return 0;
        }
        let max = total - visible;
        let rel = y.saturating_sub(area.y) as usize;
        (rel * max / (visible - 1)).min(max)
    }

    pub fn is_scrollbar_hit(x: u16, area: Rect, total: usize) -> bool {
        total > area.height as usize && x + 1 == area.right()
    }
}

impl Widget for ScrollView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let visible = area.height as usize;
        let overflow = self.lines.len() > visible;
        let width = if overflow { area.width - 1 } else { area.width };

        for (row, line) in self.lines.iter().skip(self.offset).take(visible).enumerate() {
            buf.set_line(area.x, area.y + row as u16, line, width);
        }

        if overflow {
            scrollbar(
                buf,
                area.right() - 1,
                area.y,
                visible,
                self.lines.len(),
                self.offset,
                Style::default().fg(Color::White),
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_never_scrolls_past_the_end() {
        assert_eq!(ScrollView::clamp_offset(50, 30, 10), 20);
        assert_eq!(ScrollView::clamp_offset(5, 8, 10), 0);
    }

    #[test]
    fn scrollbar_click_maps_track_to_offset() {
        let area = Rect::new(0, 10, 40, 11);
        assert_eq!(ScrollView::offset_from_scrollbar(10, area, 31), 0);
        assert_eq!(ScrollView::offset_from_scrollbar(20, area, 31), 20);
        assert_eq!(ScrollView::offset_from_scrollbar(15, area, 31), 10);
        assert!(ScrollView::is_scrollbar_hit(39, area, 31));
        assert!(!ScrollView::is_scrollbar_hit(39, area, 5));
    }
}
