//! Demo runtime: owns the terminal, runs the event loop.
//!
//! ## Inbox Pattern
//!
//! The panel posts its paint jobs to a UI inbox from whatever thread
//! triggered the render. This loop is the UI context: every frame it drains
//! the inbox into the [`TerminalCanvas`], then copies the canvas to screen.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use lorepane_core::config::Config;
use lorepane_core::display::{CenterPanelDisplayManager, UiReceiver, ui_inbox};
use ratatui::layout::Rect;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::canvas::TerminalCanvas;
use crate::demo::{self, DemoContext, HERO};
use crate::state::DemoState;
use crate::terminal::{self, DemoTerminal, TerminalGuard};
use crate::world::DemoWorld;
use crate::{render, update};

/// Frame cadence (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Full-screen demo runtime.
///
/// The terminal is restored when the runtime is dropped or on panic.
pub struct DemoRuntime {
    terminal: DemoTerminal,
    state: DemoState,
    inbox: UiReceiver,
    canvas: TerminalCanvas,
    cancel: CancellationToken,
    producers: Vec<JoinHandle<()>>,
    _guard: TerminalGuard,
}

impl DemoRuntime {
    /// Sets up the terminal and starts the producers.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(config: &Config) -> Result<Self> {
        let handle = Handle::try_current().context("The demo needs a tokio runtime")?;

        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let guard = TerminalGuard::new();

        let size = terminal.size().context("Failed to read terminal size")?;
        let (panel_rect, _) = render::layout(Rect::new(0, 0, size.width, size.height));

        let mut options = config.panel_options();
        options.geometry = render::panel_geometry(panel_rect);

        let world = Arc::new(DemoWorld::with_active(HERO));
        let (ui, inbox) = ui_inbox();
        let panel =
            CenterPanelDisplayManager::with_context(options, Arc::clone(&world), ui, handle);

        let cancel = CancellationToken::new();
        let producers = demo::spawn_producers(&DemoContext {
            panel: panel.clone(),
            world,
            modes: config.modes,
            reveal: config.reveal,
            cancel: cancel.clone(),
        });
        tracing::info!(
            width = size.width,
            height = size.height,
            "demo started"
        );

        Ok(Self {
            terminal,
            state: DemoState::new(panel, config.modes, config.panel.scroll_step),
            inbox,
            canvas: TerminalCanvas::new(panel_rect),
            cancel,
            producers,
            _guard: guard,
        })
    }

    /// Runs until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        self.shutdown();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let size = self.terminal.size().context("Failed to read terminal size")?;
            dirty |= self.sync_layout(Rect::new(0, 0, size.width, size.height));

            let painted = self.inbox.drain(&mut self.canvas);
            if painted > 0 {
                tracing::trace!(painted, "inbox drained");
            }
            dirty |= self.canvas.take_dirty();

            if dirty {
                self.draw()?;
                dirty = false;
            }

            if event::poll(FRAME_DURATION)? {
                loop {
                    match event::read()? {
                        Event::Key(key) => {
                            update::handle_key(&mut self.state, key);
                            dirty = true;
                        }
                        Event::Resize(..) => dirty = true,
                        _ => {}
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Follows terminal resizes. Returns true when the layout changed.
    fn sync_layout(&mut self, screen: Rect) -> bool {
        let (panel_rect, _) = render::layout(screen);
        if self.canvas.area() == panel_rect {
            return false;
        }
        tracing::debug!(
            width = panel_rect.width,
            height = panel_rect.height,
            "panel resized"
        );
        self.canvas.resize(panel_rect);
        self.state
            .panel
            .set_geometry(render::panel_geometry(panel_rect));
        self.state.panel.force_full_layout_render();
        true
    }

    fn draw(&mut self) -> Result<()> {
        let view = self.state.view();
        self.terminal
            .draw(|frame| render::render(frame, &self.canvas, &view))
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        self.state.panel.cancel_pending_renders();
        for producer in self.producers.drain(..) {
            producer.abort();
        }
        tracing::info!("demo stopped");
    }
}

impl Drop for DemoRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
