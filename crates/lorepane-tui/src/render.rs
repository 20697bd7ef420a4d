//! Pure view functions: read the canvas and footer state, draw a frame.

use lorepane_core::display::PanelGeometry;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::canvas::TerminalCanvas;
use crate::scrollbar::Scrollbar;
use crate::state::FooterView;

const FOOTER_HEIGHT: u16 = 1;

/// Splits the screen into the center panel and the footer.
pub fn layout(area: Rect) -> (Rect, Rect) {
    let [panel, footer] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)]).areas(area);
    (panel, footer)
}

/// Panel geometry matching a screen rectangle.
pub fn panel_geometry(panel: Rect) -> PanelGeometry {
    PanelGeometry::new(panel.x, panel.y, panel.width, panel.height)
}

/// Rows below the title, where the scrollbar lives.
fn content_rows(panel: Rect) -> Rect {
    Rect {
        y: panel.y.saturating_add(1),
        height: panel.height.saturating_sub(1),
        ..panel
    }
}

pub fn render(frame: &mut Frame, canvas: &TerminalCanvas, view: &FooterView) {
    let (panel, footer) = layout(frame.area());

    frame.render_widget(canvas, panel);
    frame.render_widget(Scrollbar::new(view.metrics), content_rows(panel));
    frame.render_widget(Paragraph::new(footer_line(view)), footer);
}

fn footer_line(view: &FooterView) -> Line<'static> {
    let key = Style::default().fg(Color::Cyan);
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(
            format!(" {} ", view.mode.display_name()),
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(" "),
    ];
    if !view.following {
        spans.push(Span::styled(
            format!("scrolled {}/{} ", view.metrics.offset, view.metrics.total_lines),
            Style::default().fg(Color::Yellow),
        ));
    }
    let bindings = [
        ("PgUp/PgDn", "scroll"),
        ("End", "follow"),
        ("c", "combat"),
        ("m", "menu"),
        ("q", "quit"),
    ];
    for (binding, action) in bindings {
        spans.push(Span::styled(binding, key));
        spans.push(Span::styled(format!(" {action}  "), dim));
    }
    Line::from(spans)
}
