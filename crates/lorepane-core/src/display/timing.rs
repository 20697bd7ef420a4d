//! Coalescing debounce / rate-limit scheduler for render actions.
//!
//! At most one action is pending at a time; later schedules overwrite it.
//! The debounce window is measured from the first trigger of a burst, so a
//! stream of triggers renders once per window and never starves. The
//! minimum-spacing window is measured from the last executed render.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::mode::DisplayMode;

/// Deferred render work.
pub type RenderAction = Box<dyn FnOnce() + Send + 'static>;

struct TimingState {
    mode: DisplayMode,
    pending: Option<RenderAction>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every cancel so a timer that already woke up can tell it is stale.
    generation: u64,
    burst_started: Option<Instant>,
    last_render: Option<Instant>,
}

impl TimingState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    fn delay_at(&self, now: Instant) -> Duration {
        let debounce = self.burst_started.map_or(self.mode.debounce(), |started| {
            self.mode
                .debounce()
                .saturating_sub(now.saturating_duration_since(started))
        });
        let spacing = self.last_render.map_or(Duration::ZERO, |last| {
            self.mode
                .min_render_delay()
                .saturating_sub(now.saturating_duration_since(last))
        });
        debounce.max(spacing)
    }

    /// Takes the pending action and marks it as rendered at `now`.
    fn take_due(&mut self, now: Instant) -> Option<RenderAction> {
        let action = self.pending.take()?;
        self.burst_started = None;
        self.last_render = Some(now);
        Some(action)
    }
}

/// Debounced render scheduler.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct DisplayTiming {
    shared: Arc<Mutex<TimingState>>,
    runtime: Handle,
}

impl std::fmt::Debug for DisplayTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("DisplayTiming")
            .field("mode", &state.mode)
            .field("pending", &state.pending.is_some())
            .field("last_render", &state.last_render)
            .finish_non_exhaustive()
    }
}

impl DisplayTiming {
    /// Creates a scheduler whose timers run on `runtime`.
    pub fn new(mode: DisplayMode, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Mutex::new(TimingState {
                mode,
                pending: None,
                timer: None,
                generation: 0,
                burst_started: None,
                last_render: None,
            })),
            runtime,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.shared.lock().mode
    }

    /// Replaces the timing policy. Pending work keeps its timer.
    pub fn set_mode(&self, mode: DisplayMode) {
        self.shared.lock().mode = mode;
    }

    /// Schedules `action`, replacing any pending one.
    ///
    /// Runs synchronously on the calling thread when no delay is due.
    pub fn schedule_render<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let now = Instant::now();
        let run_now = {
            let mut state = self.shared.lock();
            let coalesced = state.pending.is_some();
            if !coalesced {
                state.burst_started = Some(now);
            }
            state.pending = Some(Box::new(action));
            state.cancel_timer();

            let delay = state.delay_at(now);
            tracing::trace!(
                delay_ms = delay.as_millis() as u64,
                coalesced,
                "render scheduled"
            );

            if delay.is_zero() {
                state.take_due(now)
            } else {
                let generation = state.generation;
                let shared = Arc::clone(&self.shared);
                state.timer = Some(self.runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    fire(&shared, generation);
                }));
                None
            }
        };

        if let Some(action) = run_now {
            action();
        }
    }

    /// Cancels pending work and runs `action` immediately.
    pub fn force_render<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.lock();
            state.cancel_timer();
            state.pending = None;
            state.burst_started = None;
            state.last_render = Some(Instant::now());
        }
        action();
    }

    /// Cancels the timer and drops the pending action.
    pub fn cancel_pending(&self) {
        let mut state = self.shared.lock();
        state.cancel_timer();
        if state.pending.take().is_some() {
            tracing::trace!("pending render canceled");
        }
        state.burst_started = None;
    }

    pub fn has_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// When the last render executed, `None` if it never did.
    pub fn last_render_time(&self) -> Option<Instant> {
        self.shared.lock().last_render
    }
}

fn fire(shared: &Mutex<TimingState>, generation: u64) {
    let action = {
        let mut state = shared.lock();
        if state.generation != generation {
            return;
        }
        state.timer = None;
        state.take_due(Instant::now())
    };
    if let Some(action) = action {
        action();
    }
}
