use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::paint::{put_char, put_str};

/// Editable line of text with a byte cursor and a character limit.
#[derive(Clone, Debug)]
pub struct TextInputState {
    pub value: String,
    pub cursor: usize,
    limit: usize,
}

impl TextInputState {
    pub fn new(limit: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            limit,
        }
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.value.chars().count() >= self.limit {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// Renders a [`TextInputState`] with a block cursor, or a dim
/// placeholder while empty.
pub struct TextInput<'a> {
    state: &'a TextInputState,
    placeholder: &'a str,
    style: Style,
    cursor_style: Style,
}

impl<'a> TextInput<'a> {
    pub fn new(state: &'a TextInputState) -> Self {
        Self {
            state,
            placeholder: "",
            style: Style::default(),
            cursor_style: Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let y = area.y;
        let right = area.right();

        if self.state.value.is_empty() {
            put_char(buf, area.x, y, ' ', self.cursor_style);
            put_str(
                buf,
                area.x + 1,
                y,
                right,
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        // Keep the cursor on screen for long names.
        let cursor_col = self.state.value[..self.state.cursor].chars().count();
        let skip = (cursor_col + 1).saturating_sub(area.width as usize);

        let mut x = area.x;
        for (i, ch) in self.state.value.char_indices().skip(skip) {
            if x >= right {
                break;
            }
            let style = if i == self.state.cursor {
                self.cursor_style
            } else {
                self.style
            };
            put_char(buf, x, y, ch, style);
            x += 1;
        }
        if self.state.cursor >= self.state.value.len() && x < right {
            put_char(buf, x, y, ' ', self.cursor_style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_moves_cursor_over_multibyte_chars() {
        let mut input = TextInputState::new(32);
        for ch in "Délai".chars() {
            input.insert(ch);
        }
        input.left();
        input.left();
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.value, "élai");
        assert_eq!(input.cursor, 0);
        input.delete();
        assert_eq!(input.value, "lai");
    }

    #[test]
    fn limit_and_control_chars_are_ignored() {
        let mut input = TextInputState::new(3);
        for ch in "abcd\n".chars() {
            input.insert(ch);
        }
        assert_eq!(input.value, "abc");
        input.clear();
        assert!(input.value.is_empty());
        assert_eq!(input.cursor, 0);
    }
}
