use ratatui::buffer::Buffer;
use ratatui::style::Style;

/// Write `text` at (x, y), stopping before `right`. Returns the next free column.
pub(crate) fn put_str(buf: &mut Buffer, mut x: u16, y: u16, right: u16, text: &str, style: Style) -> u16 {
    for ch in text.chars() {
        if x >= right {
            break;
        }
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char(ch);
            cell.set_style(style);
        }
        x += 1;
    }
    x
}

pub(crate) fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

/// Vertical scrollbar in column `x`, rows `y..y + visible`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn scrollbar(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    visible: usize,
    total: usize,
    offset: usize,
    thumb: Style,
    track: Style,
) {
    if total <= visible || visible == 0 {
        return;
    }
    let thumb_size = ((visible * visible) / total).max(1);
    let max_offset = total - visible;
    let thumb_start = (offset.min(max_offset) * (visible - thumb_size)) / max_offset;

    for row in 0..visible {
        let in_thumb = row >= thumb_start && row < thumb_start + thumb_size;
        let (ch, style) = if in_thumb { ('┃', thumb) } else { ('│', track) };
        put_char(buf, x, y + row as u16, ch, style);
    }
}
