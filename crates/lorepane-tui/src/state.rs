//! Demo front-end state.
//!
//! The panel owns the content; this only tracks what the key bindings need.

use lorepane_core::display::{CenterPanelDisplayManager, ModeKind, ModesConfig};

pub struct DemoState {
    pub panel: CenterPanelDisplayManager,
    /// Mode values applied when a key switches modes.
    pub modes: ModesConfig,
    /// Rows moved by the arrow keys.
    pub scroll_step: usize,
    pub should_quit: bool,
}

impl DemoState {
    pub fn new(panel: CenterPanelDisplayManager, modes: ModesConfig, scroll_step: usize) -> Self {
        Self {
            panel,
            modes,
            scroll_step: scroll_step.max(1),
            should_quit: false,
        }
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.panel.mode().kind
    }

    /// Content rows under the title; a page of scrolling.
    pub fn page_rows(&self) -> usize {
        usize::from(self.panel.geometry().content_area().height).max(1)
    }

    /// Snapshot consumed by the pure render functions.
    pub fn view(&self) -> FooterView {
        FooterView {
            metrics: self.panel.scroll_metrics(),
            mode: self.mode_kind(),
            following: self.panel.with_buffer(|buffer| buffer.scroll().is_following()),
        }
    }
}

/// What the footer and scrollbar show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterView {
    pub metrics: lorepane_core::display::ScrollMetrics,
    pub mode: ModeKind,
    pub following: bool,
}
