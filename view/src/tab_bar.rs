use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::put_str;

/// A single-row strip of labels, one of them active.
///
/// Used both for the page tabs and for the bus selector. An optional
/// right-aligned status string (e.g. "OFFLINE") can be displayed.
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    active: usize,
    status: Option<(&'a str, Style)>,
    style: Style,
    active_style: Style,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], active: usize) -> Self {
        Self {
            tabs,
            active,
            status: None,
            style: Style::default().fg(Color::DarkGray),
            active_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            separator: " │ ",
        }
    }

    pub fn status(mut self, text: &'a str, style: Style) -> Self {
        self.status = Some((text, style));
        self
    }

    pub fn active_style(mut self, style: Style) -> Self {
        self.active_style = style;
        self
    }

    pub fn separator(mut self, sep: &'a str) -> Self {
        self.separator = sep;
        self
    }

    /// Column span `(start, width)` of each tab relative to the bar's left edge.
    fn spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let sep_len = self.separator.chars().count();
        let mut pos = 0;
        self.tabs.iter().enumerate().map(move |(i, tab)| {
            if i > 0 {
                pos += sep_len;
            }
            let width = tab.chars().count();
            let start = pos;
            pos += width;
            (start, width)
        })
    }

    /// Which tab a click at (x, y) landed on, for a bar rendered into `area`.
    pub fn tab_at(&self, x: u16, y: u16, area: Rect) -> Option<usize> {
        if y != area.y || x < area.x || x >= area.right() {
            return None;
        }
        let rel_x = (x - area.x) as usize;
        self.spans()
            .position(|(start, width)| rel_x >= start && rel_x < start + width)
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let y = area.y;
        let right = area.right();

        let mut x = area.x;
        for (i, &label) in self.tabs.iter().enumerate() {
            if i > 0 {
                x = put_str(buf, x, y, right, self.separator, self.style);
            }
            let style = if i == self.active {
                self.active_style
            } else {
                self.style
            };
            x = put_str(buf, x, y, right, label, style);
        }

        if let Some((text, style)) = self.status {
            let len = text.chars().count() as u16;
            let start = right.saturating_sub(len);
            if start > x {
                put_str(buf, start, y, right, text, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_at_skips_separators() {
        let tabs = ["BUS 1", "BUS 2", "INPUT"];
        let bar = TabBar::new(&tabs, 0).separator("  ");
        let area = Rect::new(2, 1, 40, 1);
        assert_eq!(bar.tab_at(2, 1, area), Some(0));
        assert_eq!(bar.tab_at(6, 1, area), Some(0));
        assert_eq!(bar.tab_at(7, 1, area), None);
        assert_eq!(bar.tab_at(9, 1, area), Some(1));
        assert_eq!(bar.tab_at(16, 1, area), Some(2));
        assert_eq!(bar.tab_at(9, 0, area), None);
    }

    #[test]
    fn status_is_right_aligned() {
        let tabs = ["A"];
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(&tabs, 0)
            .status("OFFLINE", Style::default())
            .render(area, &mut buf);
        assert_eq!(buf[(5, 0)].symbol(), "O");
        assert_eq!(buf[(11, 0)].symbol(), "E");
    }
}
