use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::{put_str, scrollbar};

/// A scrolling list of rows, one selected and optionally one marked.
///
/// The selected row follows the keyboard cursor. The marked row is the
/// value that is actually live (the effect loaded on a bus, for example)
/// and gets a bullet in the gutter.
pub struct List<'a> {
    rows: &'a [Row<'a>],
    state: &'a ListState,
    marked: Option<usize>,
    style: Style,
    selected_style: Style,
    marked_style: Style,
    detail_style: Style,
}

/// One row: a label and a dimmer right-aligned detail.
pub struct Row<'a> {
    pub label: &'a str,
    pub detail: &'a str,
}

impl<'a> Row<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label, detail: "" }
    }

    pub fn detail(mut self, detail: &'a str) -> Self {
        self.detail = detail;
        self
    }
}

/// Selection and scroll offset.
#[derive(Default, Clone, Debug)]
pub struct ListState {
    pub selected: usize,
    pub offset: usize,
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn page_down(&mut self, n: usize) {
        if self.len > 0 {
            self.selected = (self.selected + n).min(self.len - 1);
        }
    }

    pub fn page_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.selected = index;
        }
    }

    /// Change the item count, pulling the selection back in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        if self.offset >= len {
            self.offset = 0;
        }
    }

    /// Scroll so the selected row is inside a viewport of `height` rows.
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
    }

    /// Select the row under `y`. Returns the index if a row was hit.
    pub fn click_at(&mut self, y: u16, area: Rect) -> Option<usize> {
        if y < area.y || y >= area.bottom() {
            return None;
        }
        let index = self.offset + (y - area.y) as usize;
        if index < self.len {
            self.selected = index;
            Some(index)
        } else {
            None
        }
    }

    /// Scroll by a wheel step without moving the selection.
    pub fn scroll(&mut self, delta: isize, height: usize) {
        let max = self.len.saturating_sub(height);
        self.offset = self.offset.saturating_add_signed(delta).min(max);
    }
}

impl<'a> List<'a> {
    pub fn new(rows: &'a [Row<'a>], state: &'a ListState) -> Self {
        Self {
            rows,
            state,
            marked: None,
            style: Style::default(),
            selected_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            marked_style: Style::default().fg(Color::Yellow),
            detail_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn marked(mut self, index: Option<usize>) -> Self {
        self.marked = index;
        self
    }

    pub fn selected_style(mut self, style: Style) -> Self {
        self.selected_style = style;
        self
    }
}

impl Widget for List<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 3 {
            return;
        }
        let visible = area.height as usize;
        let overflow = self.rows.len() > visible;
        let right = if overflow { area.right() - 1 } else { area.right() };

        for (row, index) in (self.state.offset..self.rows.len()).take(visible).enumerate() {
            let y = area.y + row as u16;
            let item = &self.rows[index];
            let is_marked = self.marked == Some(index);
            let style = if index == self.state.selected {
                self.selected_style
            } else if is_marked {
                self.marked_style
            } else {
                self.style
            };

            // Fill so the selection bar spans the whole row.
            for x in area.x..right {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_style(style);
                }
            }

            let gutter = if is_marked { "● " } else { "  " };
            let x = put_str(buf, area.x, y, right, gutter, style);
            let end = put_str(buf, x, y, right, item.label, style);

            let detail_len = item.detail.chars().count() as u16;
            if detail_len > 0 {
                let start = right.saturating_sub(detail_len + 1);
                if start > end {
                    put_str(buf, start, y, right, item.detail, style.patch(self.detail_style));
                }
            }
        }

        if overflow {
            scrollbar(
                buf,
                area.right() - 1,
                area.y,
                visible,
                self.rows.len(),
                self.state.offset,
                Style::default().fg(Color::White),
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}
