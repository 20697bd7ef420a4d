//! Layout and paint: buffer + geometry -> paint calls.

use crate::context::{CharacterId, EnemyRef};

use super::buffer::DisplayBuffer;
use super::paint::{PaintTarget, wrapped_line_count};

/// Title shown while a fight is on screen.
pub const COMBAT_TITLE: &str = "COMBAT";

/// Content rectangle in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Columns available to text: one cell of padding on each side.
    pub fn text_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }
}

/// Summary of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOutcome {
    pub total_height: usize,
    pub scroll_offset: usize,
    pub messages_painted: usize,
}

/// Panel title for the current context.
pub fn resolve_title<'a>(
    _character: Option<CharacterId>,
    enemy: Option<EnemyRef>,
    game_title: &'a str,
) -> &'a str {
    if enemy.is_some() {
        COMBAT_TITLE
    } else {
        game_title
    }
}

/// Stateless layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRenderer {
    /// Follow the bottom when not manually scrolled; otherwise show the top.
    pub auto_scroll: bool,
}

impl Default for DisplayRenderer {
    fn default() -> Self {
        Self { auto_scroll: true }
    }
}

impl DisplayRenderer {
    pub fn new(auto_scroll: bool) -> Self {
        Self { auto_scroll }
    }

    /// Total wrapped height of the buffer at `width` columns of text.
    pub fn total_height(buffer: &DisplayBuffer, text_width: u16) -> usize {
        buffer
            .get_last(buffer.max_lines())
            .map(|message| wrapped_line_count(message.display_length(), usize::from(text_width)))
            .sum()
    }

    /// Largest valid scroll offset for the given content area.
    pub fn max_scroll_offset(buffer: &DisplayBuffer, area: Area) -> usize {
        Self::total_height(buffer, area.text_width()).saturating_sub(usize::from(area.height))
    }

    /// Paints the buffer into `area`.
    ///
    /// Degenerate areas (no text columns or no rows) are only cleared. The
    /// clamp of a manual scroll offset is persisted back into the buffer.
    pub fn render(
        &self,
        buffer: &mut DisplayBuffer,
        target: &mut dyn PaintTarget,
        area: Area,
        clear_content: bool,
    ) -> RenderOutcome {
        let clear = |target: &mut dyn PaintTarget| {
            if clear_content {
                target.clear_rect(area.x, area.y, area.width, area.height.saturating_add(1));
            }
        };

        let text_width = area.text_width();
        if buffer.is_empty() || text_width == 0 || area.height == 0 {
            clear(target);
            return RenderOutcome::default();
        }

        let heights: Vec<usize> = buffer
            .get_last(buffer.max_lines())
            .map(|message| wrapped_line_count(message.display_length(), usize::from(text_width)))
            .collect();
        let total_height: usize = heights.iter().sum();
        let viewport = usize::from(area.height);
        let max_offset = total_height.saturating_sub(viewport);

        let scroll_offset = if buffer.scroll().is_manual() {
            buffer.clamp_scroll(max_offset)
        } else if self.auto_scroll {
            max_offset
        } else {
            0
        };

        clear(target);

        let bottom = usize::from(area.y) + viewport;
        let mut y = usize::from(area.y);
        let mut consumed = 0;
        let mut painted = 0;
        for (message, height) in buffer.get_last(buffer.max_lines()).zip(heights) {
            let start = consumed;
            consumed += height;
            // Wholly above the viewport, or cut by it: partial messages are not drawn.
            if start < scroll_offset {
                continue;
            }
            if y >= bottom {
                break;
            }
            let Ok(row) = u16::try_from(y) else {
                break;
            };
            let rows = target.write_wrapped(message, area.x.saturating_add(1), row, text_width);
            y += rows.max(1);
            painted += 1;
        }

        RenderOutcome {
            total_height,
            scroll_offset,
            messages_painted: painted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EnemyId;
    use crate::display::recording::{PaintCall, RecordingCanvas};
    use crate::message::Message;

    fn buffer_of(lines: &[&str]) -> DisplayBuffer {
        let mut buffer = DisplayBuffer::with_capacity(100);
        buffer.add_range(lines.iter().copied().map(Message::from));
        buffer
    }

    #[test]
    fn test_title_resolution() {
        let enemy = EnemyRef::new(EnemyId(1), None);
        assert_eq!(resolve_title(None, Some(enemy), "DUNGEON FIGHTER"), "COMBAT");
        assert_eq!(resolve_title(Some(CharacterId(1)), None, "DUNGEON FIGHTER"), "DUNGEON FIGHTER");
    }

    #[test]
    fn test_empty_buffer_clears_only() {
        let mut canvas = RecordingCanvas::new();
        let area = Area::new(2, 3, 30, 5);
        let outcome =
            DisplayRenderer::default().render(&mut DisplayBuffer::default(), &mut canvas, area, true);

        assert_eq!(outcome, RenderOutcome::default());
        assert_eq!(canvas.calls(), [PaintCall::Clear { x: 2, y: 3, width: 30, height: 6 }]);
    }

    #[test]
    fn test_degenerate_width_clears_only() {
        let mut canvas = RecordingCanvas::new();
        let mut buffer = buffer_of(&["hello"]);
        DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 0, 2, 5), true);
        assert!(canvas.writes().is_empty());
        assert_eq!(canvas.clear_count(), 1);
    }

    #[test]
    fn test_auto_scroll_shows_bottom() {
        let lines: Vec<String> = (0..8).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut buffer = buffer_of(&refs);
        let mut canvas = RecordingCanvas::new();

        let outcome = DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 10, 40, 5), true);

        assert_eq!(outcome.total_height, 8);
        assert_eq!(outcome.scroll_offset, 3);
        let written: Vec<_> = canvas.writes().iter().map(|w| (w.text.clone(), w.y)).collect();
        assert_eq!(
            written,
            [
                ("line 3".to_string(), 10),
                ("line 4".to_string(), 11),
                ("line 5".to_string(), 12),
                ("line 6".to_string(), 13),
                ("line 7".to_string(), 14),
            ]
        );
        assert!(canvas.writes().iter().all(|w| w.x == 1 && w.max_width == 38));
    }

    #[test]
    fn test_without_auto_scroll_shows_top() {
        let lines: Vec<String> = (0..8).map(|i| format!("item {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut buffer = buffer_of(&refs);
        let mut canvas = RecordingCanvas::new();

        let outcome = DisplayRenderer::new(false).render(&mut buffer, &mut canvas, Area::new(0, 0, 40, 5), true);

        assert_eq!(outcome.scroll_offset, 0);
        assert_eq!(canvas.writes()[0].text, "item 0");
        assert_eq!(canvas.writes().len(), 5);
    }

    #[test]
    fn test_manual_offset_is_clamped_and_persisted() {
        let mut buffer = buffer_of(&["a", "b", "c", "d"]);
        buffer.set_scroll_offset(40, 100);
        let mut canvas = RecordingCanvas::new();

        let outcome = DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 0, 20, 2), true);

        assert_eq!(outcome.scroll_offset, 2);
        assert_eq!(buffer.scroll().raw_offset(), 2);
        assert!(buffer.scroll().is_manual());
    }

    #[test]
    fn test_partially_scrolled_message_is_skipped() {
        // width 12 -> 10 text columns; the first message wraps to 2 rows
        let mut buffer = buffer_of(&["aaaaaaaaaaaaaaa", "b", "c", "d"]);
        buffer.set_scroll_offset(1, 3);
        let mut canvas = RecordingCanvas::new();

        DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 0, 12, 2), true);

        let texts: Vec<_> = canvas.writes().iter().map(|w| w.text.clone()).collect();
        assert_eq!(texts, ["b", "c"]);
    }

    #[test]
    fn test_wrapped_messages_advance_rows() {
        let mut buffer = buffer_of(&["x".repeat(25).as_str(), "tail"]);
        let mut canvas = RecordingCanvas::new();

        let outcome = DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 0, 12, 10), true);

        assert_eq!(outcome.total_height, 4);
        assert_eq!(canvas.writes()[0].lines, 3);
        assert_eq!(canvas.writes()[1].y, 3);
    }

    #[test]
    fn test_no_clear_when_disabled() {
        let mut buffer = buffer_of(&["one"]);
        let mut canvas = RecordingCanvas::new();
        DisplayRenderer::default().render(&mut buffer, &mut canvas, Area::new(0, 0, 20, 3), false);
        assert_eq!(canvas.clear_count(), 0);
        assert_eq!(canvas.writes().len(), 1);
    }
}
