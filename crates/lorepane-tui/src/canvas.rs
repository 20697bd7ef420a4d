//! Off-screen terminal canvas the panel paints into.
//!
//! The panel pipeline writes through [`PaintTarget`]; the runtime copies the
//! canvas into each ratatui frame.

use lorepane_core::display::{PaintTarget, wrapped_line_count};
use lorepane_core::{Message, Style};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style as CellStyle};
use ratatui::widgets::Widget;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Maps a semantic style tag to terminal colors.
pub fn cell_style(style: Style) -> CellStyle {
    let base = CellStyle::default();
    match style {
        Style::Plain | Style::Narrative => base,
        Style::Title => base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Style::Header => base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Style::Environment => base.fg(Color::Green),
        Style::Player => base.fg(Color::LightBlue),
        Style::Enemy => base.fg(Color::Red),
        Style::Damage => base.fg(Color::LightRed),
        Style::Critical => base.fg(Color::Red).add_modifier(Modifier::BOLD),
        Style::Heal => base.fg(Color::LightGreen),
        Style::Miss | Style::Dim => base.fg(Color::DarkGray),
        Style::Effect => base.fg(Color::Magenta),
        Style::Loot => base.fg(Color::Yellow),
        Style::Menu => base.fg(Color::White),
        Style::MenuKey => base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Style::System => base.fg(Color::Gray),
        Style::Warning => base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}

/// A ratatui buffer that implements [`PaintTarget`].
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    buffer: Buffer,
    dirty: bool,
}

impl TerminalCanvas {
    pub fn new(area: Rect) -> Self {
        Self {
            buffer: Buffer::empty(area),
            dirty: true,
        }
    }

    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    /// Replaces the canvas with a blank one of the new size.
    pub fn resize(&mut self, area: Rect) {
        if self.buffer.area != area {
            self.buffer = Buffer::empty(area);
            self.dirty = true;
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns whether a refresh happened since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Row `y` as plain text, trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let area = self.buffer.area;
        let mut row = String::new();
        for x in area.left()..area.right() {
            if let Some(cell) = self.buffer.cell((x, y)) {
                row.push_str(cell.symbol());
            }
        }
        row.trim_end().to_string()
    }

    fn put(&mut self, x: u16, y: u16, grapheme: &str, style: CellStyle) {
        if !self.buffer.area.contains(Position { x, y }) {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((x, y)) {
            cell.set_symbol(grapheme).set_style(style);
        }
    }
}

impl PaintTarget for TerminalCanvas {
    fn clear_rect(&mut self, x: u16, y: u16, width: u16, height: u16) {
        let rect = Rect::new(x, y, width, height).intersection(self.buffer.area);
        for row in rect.top()..rect.bottom() {
            for col in rect.left()..rect.right() {
                if let Some(cell) = self.buffer.cell_mut((col, row)) {
                    cell.reset();
                }
            }
        }
    }

    fn write_wrapped(&mut self, message: &Message, x: u16, y: u16, max_width: u16) -> usize {
        let width = usize::from(max_width);
        let lines = wrapped_line_count(message.display_length(), width);
        if width == 0 {
            return lines;
        }

        // Cells are laid out by running display offset, so the row count
        // always matches `wrapped_line_count`.
        let mut offset = 0usize;
        for span in &message.spans {
            let style = cell_style(span.style);
            for grapheme in span.text.graphemes(true) {
                let w = grapheme.width();
                if w == 0 {
                    continue;
                }
                let row = offset / width;
                let col = offset % width;
                offset += w;
                if col + w > width {
                    continue;
                }
                let (Ok(row), Ok(col)) = (u16::try_from(row), u16::try_from(col)) else {
                    break;
                };
                self.put(x.saturating_add(col), y.saturating_add(row), grapheme, style);
            }
        }
        lines
    }

    fn refresh(&mut self) {
        self.dirty = true;
    }
}

impl Widget for &TerminalCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(self.buffer.area).intersection(buf.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), buf.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lorepane_core::StyledSpan;

    use super::*;

    fn canvas(width: u16, height: u16) -> TerminalCanvas {
        TerminalCanvas::new(Rect::new(0, 0, width, height))
    }

    #[test]
    fn test_write_wraps_by_width() {
        let mut canvas = canvas(10, 4);
        let rows = canvas.write_wrapped(&Message::plain("abcdefghij"), 1, 0, 4);

        assert_eq!(rows, 3);
        assert_eq!(canvas.row_text(0), " abcd");
        assert_eq!(canvas.row_text(1), " efgh");
        assert_eq!(canvas.row_text(2), " ij");
    }

    #[test]
    fn test_write_clips_to_canvas() {
        let mut canvas = canvas(6, 2);
        let rows = canvas.write_wrapped(&Message::plain("abcdefghijkl"), 0, 1, 5);

        assert_eq!(rows, 3);
        assert_eq!(canvas.row_text(1), "abcde");
    }

    #[test]
    fn test_spans_keep_their_style() {
        let mut canvas = canvas(20, 1);
        let message = Message::from_spans(vec![
            StyledSpan::new("Orc", Style::Enemy),
            StyledSpan::plain(" hits"),
        ]);
        canvas.write_wrapped(&message, 0, 0, 20);

        let orc = canvas.buffer().cell((0, 0)).unwrap();
        assert_eq!(orc.fg, Color::Red);
        let space = canvas.buffer().cell((3, 0)).unwrap();
        assert_eq!(space.fg, Color::Reset);
    }

    #[test]
    fn test_wide_graphemes_count_two_cells() {
        let mut canvas = canvas(10, 2);
        let rows = canvas.write_wrapped(&Message::plain("龍龍龍"), 0, 0, 4);

        assert_eq!(rows, 2);
        assert_eq!(canvas.buffer().cell((0, 1)).unwrap().symbol(), "龍");
    }

    #[test]
    fn test_clear_rect_resets_cells() {
        let mut canvas = canvas(5, 2);
        canvas.write_wrapped(&Message::plain("hello"), 0, 0, 5);
        canvas.clear_rect(0, 0, 3, 1);

        assert_eq!(canvas.row_text(0), "   lo");
    }

    #[test]
    fn test_refresh_marks_dirty() {
        let mut canvas = canvas(5, 2);
        assert!(canvas.take_dirty());
        assert!(!canvas.take_dirty());

        canvas.refresh();
        assert!(canvas.take_dirty());
    }
}
