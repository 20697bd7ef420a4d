//! Panel scrollbar with a fixed-size thumb.
//!
//! The thumb length is computed once from the content/viewport ratio and the
//! thumb lands exactly on the last row when the view is at the bottom.

use lorepane_core::display::ScrollMetrics;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

const THUMB: &str = "█";
const TRACK: &str = "│";

/// Vertical scrollbar drawn on the right edge of its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    metrics: ScrollMetrics,
}

impl Scrollbar {
    pub fn new(metrics: ScrollMetrics) -> Self {
        Self { metrics }
    }

    /// Hidden when everything fits.
    pub fn is_visible(&self) -> bool {
        self.metrics.total_lines > self.metrics.viewport
    }

    /// `(start, len)` of the thumb on a track of `track_len` rows.
    pub fn thumb(&self, track_len: usize) -> Option<(usize, usize)> {
        let ScrollMetrics {
            total_lines,
            viewport,
            offset,
        } = self.metrics;
        let max_offset = total_lines.saturating_sub(viewport);
        if track_len == 0 || max_offset == 0 {
            return None;
        }

        // round(track * visible / (total - 1 + visible))
        let visible = viewport.min(track_len) as u64;
        let denom = (total_lines as u64).saturating_sub(1) + visible;
        let len = if denom == 0 {
            track_len
        } else {
            let rounded = (track_len as u64 * visible + denom / 2) / denom;
            (rounded as usize).clamp(1, track_len)
        };

        let travel = (track_len - len) as u64;
        let start = (offset.min(max_offset) as u64 * travel / max_offset as u64) as usize;
        Some((start, len))
    }
}

impl Widget for Scrollbar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.is_visible() || area.width == 0 {
            return;
        }
        let Some((start, len)) = self.thumb(usize::from(area.height)) else {
            return;
        };

        let x = area.right() - 1;
        let style = Style::default().fg(Color::DarkGray);
        for (row, y) in (area.top()..area.bottom()).enumerate() {
            let symbol = if (start..start + len).contains(&row) {
                THUMB
            } else {
                TRACK
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}
