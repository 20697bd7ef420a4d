//! The center panel orchestrator.
//!
//! Producers call into [`CenterPanelDisplayManager`] from any thread. Messages
//! land in the buffer immediately; renders go through the mode's
//! [`DisplayTiming`], are gated by the [`RenderStateManager`] diff, and the
//! actual painting is posted to the UI inbox.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;

use super::batch::DisplayBatchTransaction;
use super::buffer::{BufferOptions, DisplayBuffer};
use super::chunk::{RevealConfig, split_into_chunks};
use super::filter::{AllowAll, MessageFilter};
use super::inbox::UiSender;
use super::mode::DisplayMode;
use super::paint::PaintTarget;
use super::render_state::{RenderState, RenderStateManager};
use super::renderer::{Area, DisplayRenderer, resolve_title};
use super::timing::DisplayTiming;
use crate::context::{ActiveCharacterOracle, ContextProvider};
use crate::error::PanelError;
use crate::message::{Message, MessageKind, Style};

/// Callback that replaces the built-in render on triggers.
pub type ExternalRender = Arc<dyn Fn() + Send + Sync>;

/// The whole center panel in cells. Row `y` is the title row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 80,
            height: 24,
        }
    }
}

impl PanelGeometry {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Everything below the title row.
    pub fn content_area(&self) -> Area {
        Area::new(
            self.x,
            self.y.saturating_add(1),
            self.width,
            self.height.saturating_sub(1),
        )
    }
}

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOptions {
    pub buffer: BufferOptions,
    pub mode: DisplayMode,
    pub game_title: String,
    /// When false, renders are skipped entirely (headless runs).
    pub output_enabled: bool,
    pub geometry: PanelGeometry,
}

impl PanelOptions {
    pub const DEFAULT_GAME_TITLE: &str = "DUNGEON FIGHTER";
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            buffer: BufferOptions::default(),
            mode: DisplayMode::STANDARD,
            game_title: Self::DEFAULT_GAME_TITLE.to_string(),
            output_enabled: true,
            geometry: PanelGeometry::default(),
        }
    }
}

/// Render counters, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelStats {
    /// Paint jobs that ran on the UI context.
    pub performed: u64,
    /// Paint jobs handed to the UI inbox.
    pub posted: u64,
    /// Renders skipped because nothing changed.
    pub skipped: u64,
    /// Renders dropped because a paint was still in flight.
    pub dropped: u64,
}

/// Scroll position in wrapped rows, for scrollbars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub total_lines: usize,
    pub viewport: usize,
    pub offset: usize,
}

// Replay requests, ordered so that `fetch_max` keeps the strongest one.
const REPLAY_NONE: u8 = 0;
const REPLAY_DIFF: u8 = 1;
const REPLAY_FORCED: u8 = 2;

#[derive(Debug, Default)]
struct Counters {
    performed: AtomicU64,
    posted: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

struct PanelShared {
    // Lock order: buffer before render_state. Mode and geometry are copied out.
    buffer: Mutex<DisplayBuffer>,
    render_state: Mutex<RenderStateManager>,
    mode: Mutex<DisplayMode>,
    geometry: Mutex<PanelGeometry>,
    external_render: Mutex<Option<ExternalRender>>,
    filter: RwLock<Box<dyn MessageFilter>>,
    context: Arc<dyn ContextProvider>,
    oracle: Arc<dyn ActiveCharacterOracle>,
    ui: UiSender,
    is_rendering: AtomicBool,
    replay: AtomicU8,
    game_title: String,
    output_enabled: bool,
    counters: Counters,
}

/// Releases the render latch when the paint job finishes or is dropped unsent.
struct RenderLatch(Arc<PanelShared>);

impl Drop for RenderLatch {
    fn drop(&mut self) {
        self.0.is_rendering.store(false, Ordering::Release);
    }
}

impl PanelShared {
    fn allows(&self, kind: MessageKind) -> bool {
        self.filter.read().should_display(kind)
    }

    fn current_state(&self) -> RenderState {
        let buffer = self.buffer.lock();
        self.render_state
            .lock()
            .get_render_state(&buffer, &*self.context, &*self.oracle)
    }

    /// Diff-gates a render and posts the paint work to the UI context.
    fn perform_render(self: &Arc<Self>, force: bool) {
        if !self.output_enabled {
            return;
        }
        if self
            .is_rendering
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let request = if force { REPLAY_FORCED } else { REPLAY_DIFF };
            self.replay.fetch_max(request, Ordering::AcqRel);
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(force, "render dropped, paint in flight");
            return;
        }
        let latch = RenderLatch(Arc::clone(self));

        let state = self.current_state();
        if !state.needs_render && !force {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let shared = Arc::clone(self);
        let posted = self.ui.post(move |target| {
            shared.paint(target, &state);
            drop(latch);
            match shared.replay.swap(REPLAY_NONE, Ordering::AcqRel) {
                REPLAY_NONE => {}
                request => shared.perform_render(request == REPLAY_FORCED),
            }
        });
        match posted {
            Ok(()) => {
                self.counters.posted.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => tracing::debug!(%err, "paint job not delivered"),
        }
    }

    /// Runs on the UI context.
    fn paint(&self, target: &mut dyn PaintTarget, state: &RenderState) {
        let mode = *self.mode.lock();
        let geometry = *self.geometry.lock();
        let clear_canvas = RenderStateManager::should_clear_canvas(state, &mode);

        let mut buffer = self.buffer.lock();
        if state.needs_full_layout {
            if clear_canvas {
                target.clear_rect(geometry.x, geometry.y, geometry.width, geometry.height);
            }
            self.paint_title(target, geometry, state);
        }

        let outcome = DisplayRenderer::new(mode.auto_scroll).render(
            &mut buffer,
            target,
            geometry.content_area(),
            true,
        );
        target.refresh();
        self.render_state
            .lock()
            .record_render(&buffer, &*self.context, &*self.oracle);
        drop(buffer);

        self.counters.performed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            full_layout = state.needs_full_layout,
            clear_canvas,
            total_height = outcome.total_height,
            scroll_offset = outcome.scroll_offset,
            "panel painted"
        );
    }

    fn paint_title(&self, target: &mut dyn PaintTarget, geometry: PanelGeometry, state: &RenderState) {
        if geometry.width <= 2 || geometry.height == 0 {
            return;
        }
        let title = resolve_title(state.character, state.enemy, &self.game_title);
        target.clear_rect(geometry.x, geometry.y, geometry.width, 1);
        target.write_wrapped(
            &Message::styled(title, Style::Title),
            geometry.x.saturating_add(1),
            geometry.y,
            geometry.width - 2,
        );
    }
}

/// Orchestrates buffer, timing, diffing and painting for one panel.
///
/// Cheap to clone; clones share the same panel.
#[derive(Clone)]
pub struct CenterPanelDisplayManager {
    shared: Arc<PanelShared>,
    timing: DisplayTiming,
    runtime: Handle,
}

impl std::fmt::Debug for CenterPanelDisplayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CenterPanelDisplayManager")
            .field("mode", &*self.shared.mode.lock())
            .field("geometry", &*self.shared.geometry.lock())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl CenterPanelDisplayManager {
    /// Creates a panel. Timers and delayed batches run on `runtime`.
    pub fn new(
        options: PanelOptions,
        context: Arc<dyn ContextProvider>,
        oracle: Arc<dyn ActiveCharacterOracle>,
        ui: UiSender,
        runtime: Handle,
    ) -> Self {
        let shared = Arc::new(PanelShared {
            buffer: Mutex::new(DisplayBuffer::new(options.buffer)),
            render_state: Mutex::new(RenderStateManager::new()),
            mode: Mutex::new(options.mode),
            geometry: Mutex::new(options.geometry),
            external_render: Mutex::new(None),
            filter: RwLock::new(Box::new(AllowAll)),
            context,
            oracle,
            ui,
            is_rendering: AtomicBool::new(false),
            replay: AtomicU8::new(REPLAY_NONE),
            game_title: options.game_title,
            output_enabled: options.output_enabled,
            counters: Counters::default(),
        });
        Self {
            shared,
            timing: DisplayTiming::new(options.mode, runtime.clone()),
            runtime,
        }
    }

    /// Creates a panel whose context provider is also the oracle.
    pub fn with_context<C>(options: PanelOptions, context: Arc<C>, ui: UiSender, runtime: Handle) -> Self
    where
        C: ContextProvider + ActiveCharacterOracle + 'static,
    {
        let oracle: Arc<dyn ActiveCharacterOracle> = Arc::<C>::clone(&context);
        Self::new(options, context, oracle, ui, runtime)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn mode(&self) -> DisplayMode {
        *self.shared.mode.lock()
    }

    /// Switches the timing policy. A different category cancels pending renders.
    pub fn set_mode(&self, mode: DisplayMode) {
        let previous = std::mem::replace(&mut *self.shared.mode.lock(), mode);
        if previous.kind != mode.kind {
            self.timing.cancel_pending();
            tracing::debug!(
                from = previous.kind.display_name(),
                to = mode.kind.display_name(),
                "display mode switched"
            );
        }
        self.timing.set_mode(mode);
    }

    /// Routes triggers to `callback` instead of the built-in render. `None` restores it.
    pub fn set_external_render_callback(&self, callback: Option<ExternalRender>) {
        *self.shared.external_render.lock() = callback;
    }

    pub fn set_filter<F>(&self, filter: F)
    where
        F: MessageFilter + 'static,
    {
        *self.shared.filter.write() = Box::new(filter);
    }

    pub fn geometry(&self) -> PanelGeometry {
        *self.shared.geometry.lock()
    }

    /// Updates the panel rectangle; the next render is a full layout.
    pub fn set_geometry(&self, geometry: PanelGeometry) {
        let changed = std::mem::replace(&mut *self.shared.geometry.lock(), geometry) != geometry;
        if changed {
            self.shared.render_state.lock().reset();
        }
    }

    // ------------------------------------------------------------------
    // Adding content
    // ------------------------------------------------------------------

    /// Adds a `System` message and schedules a render.
    pub fn add_message(&self, message: impl Into<Message>) {
        self.add_message_kind(message, MessageKind::System);
    }

    /// Adds a message if the filter lets `kind` through, then schedules a render.
    pub fn add_message_kind(&self, message: impl Into<Message>, kind: MessageKind) {
        if !self.shared.allows(kind) {
            return;
        }
        self.shared.buffer.lock().add(message.into());
        self.trigger_render();
    }

    /// Adds messages in order with one render request. Empty input is a no-op.
    pub fn add_messages<I>(&self, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        if self.append(messages) {
            self.trigger_render();
        }
    }

    /// Adds a batch and requests a render after `delay`, without blocking.
    pub fn add_message_batch<I>(&self, messages: I, delay: Duration)
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        if !self.append(messages) {
            return;
        }
        if delay.is_zero() {
            self.trigger_render();
        } else {
            let panel = self.clone();
            self.runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                panel.trigger_render();
            });
        }
    }

    /// Adds a batch, waits `delay`, then requests a render.
    pub async fn add_message_batch_async<I>(&self, messages: I, delay: Duration)
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        if !self.append(messages) {
            return;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.trigger_render();
    }

    /// Splits `text` per `config` and adds every chunk at once, with one render request.
    pub fn write_chunked(&self, text: &str, config: &RevealConfig) {
        if !self.shared.allows(MessageKind::System) {
            return;
        }
        if !config.enabled {
            self.add_text_lines(text);
            self.trigger_render();
            return;
        }

        let chunks = split_into_chunks(text, config.strategy);
        if chunks.is_empty() {
            return;
        }
        {
            let mut buffer = self.shared.buffer.lock();
            let last = chunks.len() - 1;
            for (i, chunk) in chunks.iter().enumerate() {
                buffer.add_range(chunk.lines().map(Message::plain));
                if config.add_blank_line_between_chunks && i < last {
                    buffer.add(Message::empty());
                }
            }
        }
        tracing::debug!(chunks = chunks.len(), "chunked text added");
        self.trigger_render();
    }

    /// Paced variant of [`Self::write_chunked`]: one chunk at a time, pausing
    /// [`RevealConfig::delay_for`] between chunks.
    pub async fn reveal_chunked_async(&self, text: &str, config: &RevealConfig) {
        if !config.enabled {
            self.write_chunked(text, config);
            return;
        }
        if !self.shared.allows(MessageKind::System) {
            return;
        }

        let chunks = split_into_chunks(text, config.strategy);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            {
                let mut buffer = self.shared.buffer.lock();
                buffer.add_range(chunk.lines().map(Message::plain));
                if config.add_blank_line_between_chunks && i < last {
                    buffer.add(Message::empty());
                }
            }
            self.trigger_render();
            if i < last {
                tokio::time::sleep(config.delay_for(chunk)).await;
            }
        }
    }

    fn add_text_lines(&self, text: &str) {
        let mut buffer = self.shared.buffer.lock();
        if text.is_empty() {
            buffer.add(Message::empty());
        } else {
            buffer.add_range(text.lines().map(Message::plain));
        }
    }

    /// Filtered `System` append. Returns true if anything was offered to the buffer.
    fn append<I>(&self, messages: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        if !self.shared.allows(MessageKind::System) {
            return false;
        }
        let mut messages = messages.into_iter().map(Into::into).peekable();
        if messages.peek().is_none() {
            return false;
        }
        self.shared.buffer.lock().add_range(messages);
        true
    }

    /// Flushes a committed batch through the filtered add path.
    pub(crate) fn flush_batch(&self, messages: Vec<Message>, auto_render: bool) -> usize {
        let count = messages.len();
        if !self.append(messages) {
            return 0;
        }
        tracing::debug!(count, auto_render, "batch flushed");
        if auto_render {
            self.trigger_render();
        }
        count
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    /// Starts a batch. Dropping it without [`DisplayBatchTransaction::commit`] discards it.
    pub fn start_batch(&self, auto_render: bool) -> DisplayBatchTransaction<'_> {
        DisplayBatchTransaction::new(self, auto_render)
    }

    /// Runs `f` with a batch; commits on `Ok`, discards on `Err`.
    pub fn batch<T, E, F>(&self, auto_render: bool, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut DisplayBatchTransaction<'_>) -> Result<T, E>,
        E: From<PanelError>,
    {
        let mut tx = self.start_batch(auto_render);
        match f(&mut tx) {
            Ok(value) => {
                if !tx.is_released() {
                    tx.commit()?;
                }
                Ok(value)
            }
            Err(err) => {
                tx.discard();
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Schedules a render through the mode's timing policy.
    pub fn trigger_render(&self) {
        let external = self.shared.external_render.lock().clone();
        if let Some(callback) = external {
            self.timing.schedule_render(move || callback());
        } else {
            let shared = Arc::clone(&self.shared);
            self.timing.schedule_render(move || shared.perform_render(false));
        }
    }

    /// Renders now, even if nothing changed.
    pub fn force_render(&self) {
        let shared = Arc::clone(&self.shared);
        self.timing.force_render(move || shared.perform_render(true));
    }

    /// Forgets the last paint and renders a full layout now.
    pub fn force_full_layout_render(&self) {
        self.shared.render_state.lock().reset();
        self.force_now();
    }

    pub fn cancel_pending_renders(&self) {
        self.timing.cancel_pending();
    }

    fn force_now(&self) {
        let shared = Arc::clone(&self.shared);
        self.timing.force_render(move || shared.perform_render(false));
    }

    /// Empties the panel and renders immediately.
    pub fn clear(&self) {
        self.reset_content();
        self.force_now();
    }

    /// Empties the panel without rendering; pending renders are canceled.
    pub fn clear_without_render(&self) {
        self.reset_content();
        self.timing.cancel_pending();
    }

    fn reset_content(&self) {
        let mut buffer = self.shared.buffer.lock();
        buffer.clear();
        self.shared.render_state.lock().reset();
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    fn max_scroll_offset(&self, buffer: &DisplayBuffer) -> usize {
        DisplayRenderer::max_scroll_offset(buffer, self.geometry().content_area())
    }

    /// Scrolls toward older content and renders immediately.
    pub fn scroll_up(&self, lines: usize) {
        {
            let mut buffer = self.shared.buffer.lock();
            let max = self.max_scroll_offset(&buffer);
            buffer.scroll_up(lines, max);
        }
        self.force_now();
    }

    /// Scrolls toward newer content and renders immediately.
    pub fn scroll_down(&self, lines: usize) {
        {
            let mut buffer = self.shared.buffer.lock();
            let max = self.max_scroll_offset(&buffer);
            buffer.scroll_down(lines, max);
        }
        self.force_now();
    }

    /// Returns to auto-follow and schedules a render.
    pub fn reset_scroll(&self) {
        self.shared.buffer.lock().reset_scroll();
        self.trigger_render();
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        let area = self.geometry().content_area();
        let auto_scroll = self.mode().auto_scroll;
        let buffer = self.shared.buffer.lock();
        let total_lines = DisplayRenderer::total_height(&buffer, area.text_width());
        let viewport = usize::from(area.height);
        let max = total_lines.saturating_sub(viewport);
        let offset = if buffer.scroll().is_manual() {
            buffer.scroll_offset(max)
        } else if auto_scroll {
            max
        } else {
            0
        };
        ScrollMetrics {
            total_lines,
            viewport,
            offset,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Runs `f` with the buffer locked.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&DisplayBuffer) -> R) -> R {
        f(&self.shared.buffer.lock())
    }

    pub fn buffer_len(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    /// Snapshot of the stored messages, oldest first.
    pub fn lines(&self) -> Vec<Message> {
        self.shared.buffer.lock().iter().cloned().collect()
    }

    pub fn has_pending_render(&self) -> bool {
        self.timing.has_pending()
    }

    pub fn stats(&self) -> PanelStats {
        let counters = &self.shared.counters;
        PanelStats {
            performed: counters.performed.load(Ordering::Relaxed),
            posted: counters.posted.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
            dropped: counters.dropped.load(Ordering::Relaxed),
        }
    }
}
