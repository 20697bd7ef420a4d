//! End-to-end: producers -> panel -> UI inbox -> recording canvas.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lorepane_core::context::{CharacterId, EnemyId, EnemyRef, StaticContext};
use lorepane_core::display::{
    BufferOptions, COMBAT_TITLE, CenterPanelDisplayManager, ChunkStrategy, DisplayMode,
    PanelGeometry, PanelOptions, RecordingCanvas, RevealConfig, UiReceiver, ui_inbox,
};
use lorepane_core::{MessageKind, PanelError};
use tokio::runtime::Handle;

const HERO: CharacterId = CharacterId(1);

/// Standard behavior without the debounce, so renders post inline.
const IMMEDIATE: DisplayMode = DisplayMode {
    debounce_ms: 0,
    ..DisplayMode::STANDARD
};

struct Harness {
    panel: CenterPanelDisplayManager,
    inbox: UiReceiver,
    context: Arc<StaticContext>,
    canvas: RecordingCanvas,
}

impl Harness {
    fn new(options: PanelOptions) -> Self {
        let (ui, inbox) = ui_inbox();
        let context = Arc::new(StaticContext::new());
        let panel = CenterPanelDisplayManager::with_context(
            options,
            Arc::clone(&context),
            ui,
            Handle::current(),
        );
        Self {
            panel,
            inbox,
            context,
            canvas: RecordingCanvas::new(),
        }
    }

    fn immediate() -> Self {
        Self::new(PanelOptions {
            mode: IMMEDIATE,
            ..PanelOptions::default()
        })
    }

    fn small(max_lines: usize) -> Self {
        Self::new(PanelOptions {
            mode: IMMEDIATE,
            buffer: BufferOptions {
                max_lines,
                ..BufferOptions::default()
            },
            geometry: PanelGeometry::new(0, 0, 40, 6),
            ..PanelOptions::default()
        })
    }

    fn drain(&mut self) -> usize {
        self.inbox.drain(&mut self.canvas)
    }

    fn title(&self) -> Option<String> {
        self.canvas
            .writes()
            .iter()
            .rev()
            .find(|write| write.y == 0)
            .map(|write| write.text.clone())
    }
}

fn lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line {i}")).collect()
}

#[tokio::test]
async fn test_message_reaches_canvas() {
    let mut h = Harness::immediate();

    h.panel.add_message("You wake in a damp cell.");
    assert_eq!(h.drain(), 1);

    assert_eq!(h.canvas.visible_text(), ["You wake in a damp cell."]);
    assert_eq!(h.canvas.refresh_count(), 1);
    assert_eq!(h.panel.stats().performed, 1);
}

#[tokio::test]
async fn test_unchanged_state_skips_render() {
    let mut h = Harness::immediate();
    h.panel.add_message("Torchlight flickers.");
    h.drain();

    h.panel.trigger_render();
    assert_eq!(h.drain(), 0);
    let stats = h.panel.stats();
    assert_eq!(stats.posted, 1);
    assert_eq!(stats.skipped, 1);

    h.panel.add_message("Footsteps echo.");
    assert_eq!(h.drain(), 1);
    assert_eq!(h.panel.stats().posted, 2);
}

#[tokio::test]
async fn test_force_render_ignores_diff() {
    let mut h = Harness::immediate();
    h.panel.add_message("Torchlight flickers.");
    h.drain();

    h.panel.force_render();
    assert_eq!(h.drain(), 1);
    assert_eq!(h.panel.stats().performed, 2);
}

#[tokio::test]
async fn test_overflow_evicts_oldest() {
    let mut h = Harness::small(3);
    h.panel.add_messages(["a", "b", "c", "d"]);
    h.drain();

    let stored: Vec<String> = h.panel.lines().iter().map(|m| m.plain_text()).collect();
    assert_eq!(stored, ["b", "c", "d"]);
    assert_eq!(h.canvas.visible_text(), ["b", "c", "d"]);
}

#[tokio::test]
async fn test_follow_shows_newest_rows() {
    let mut h = Harness::small(100);
    h.panel.add_messages(lines(8));
    h.drain();

    // Height 6 leaves five content rows under the title.
    assert_eq!(
        h.canvas.visible_text(),
        ["line 3", "line 4", "line 5", "line 6", "line 7"]
    );
    let metrics = h.panel.scroll_metrics();
    assert_eq!(metrics.total_lines, 8);
    assert_eq!(metrics.viewport, 5);
    assert_eq!(metrics.offset, 3);
}

#[tokio::test]
async fn test_scroll_up_renders_immediately() {
    let mut h = Harness::small(100);
    h.panel.add_messages(lines(8));
    h.drain();

    h.panel.scroll_up(2);
    assert_eq!(h.drain(), 1);
    assert_eq!(
        h.canvas.visible_text(),
        ["line 1", "line 2", "line 3", "line 4", "line 5"]
    );

    // New content does not move a pinned view.
    h.panel.add_message("line 8");
    h.drain();
    assert_eq!(h.canvas.visible_text()[0], "line 1");

    h.panel.reset_scroll();
    h.drain();
    assert_eq!(h.canvas.visible_text()[0], "line 4");
}

#[tokio::test]
async fn test_title_follows_enemy() {
    let mut h = Harness::immediate();
    h.context.set_character(Some(HERO));
    h.panel.add_message("A quiet corridor.");
    h.drain();
    assert_eq!(h.title().as_deref(), Some(PanelOptions::DEFAULT_GAME_TITLE));

    h.context
        .set_enemy(Some(EnemyRef::new(EnemyId(7), Some(HERO))));
    h.panel.add_message("A skeleton rises!");
    h.drain();
    assert_eq!(h.title().as_deref(), Some(COMBAT_TITLE));
}

#[tokio::test]
async fn test_enemy_of_inactive_character_is_ignored() {
    let mut h = Harness::immediate();
    h.context.set_character(Some(HERO));
    h.panel.add_message("Quiet.");
    h.drain();

    h.context
        .set_enemy(Some(EnemyRef::new(EnemyId(9), Some(CharacterId(2)))));
    h.panel.trigger_render();
    assert_eq!(h.drain(), 0);
    assert_eq!(h.title().as_deref(), Some(PanelOptions::DEFAULT_GAME_TITLE));
}

#[tokio::test]
async fn test_batch_commits_once() {
    let mut h = Harness::immediate();

    let mut tx = h.panel.start_batch(true);
    tx.add("You find 12 gold.").unwrap();
    tx.add_range(["You find a rusty key."]).unwrap();
    assert_eq!(h.panel.buffer_len(), 0);
    assert_eq!(tx.commit().unwrap(), 2);

    assert_eq!(tx.add("late"), Err(PanelError::TransactionReleased));
    assert_eq!(tx.commit(), Err(PanelError::TransactionReleased));
    drop(tx);

    assert_eq!(h.drain(), 1);
    assert_eq!(
        h.canvas.visible_text(),
        ["You find 12 gold.", "You find a rusty key."]
    );
}

#[tokio::test]
async fn test_batch_discards_on_error() {
    let h = Harness::immediate();

    let result: anyhow::Result<()> = h.panel.batch(true, |tx| {
        tx.add("half a message")?;
        anyhow::bail!("loot table missing")
    });
    assert!(result.is_err());
    assert_eq!(h.panel.buffer_len(), 0);

    {
        let mut tx = h.panel.start_batch(true);
        tx.add("never committed").unwrap();
    }
    assert_eq!(h.panel.buffer_len(), 0);
}

#[tokio::test]
async fn test_filter_blocks_kinds() {
    let mut h = Harness::immediate();
    h.panel
        .set_filter(|kind: MessageKind| kind != MessageKind::RollInfo);

    h.panel.add_message_kind("d20: 17", MessageKind::RollInfo);
    assert_eq!(h.panel.buffer_len(), 0);
    assert_eq!(h.drain(), 0);

    h.panel.add_message_kind("You hit for 6.", MessageKind::Combat);
    h.drain();
    assert_eq!(h.canvas.visible_text(), ["You hit for 6."]);
}

#[tokio::test]
async fn test_write_chunked_adds_all_chunks() {
    let mut h = Harness::immediate();
    let config = RevealConfig {
        strategy: ChunkStrategy::Sentence,
        add_blank_line_between_chunks: true,
        ..RevealConfig::default()
    };

    h.panel
        .write_chunked("The door creaks. A cold wind blows.", &config);
    assert_eq!(h.drain(), 1);
    assert_eq!(
        h.canvas.visible_text(),
        ["The door creaks.", "", "A cold wind blows."]
    );
}

#[tokio::test]
async fn test_clear_empties_panel() {
    let mut h = Harness::immediate();
    h.panel.add_messages(["one", "two"]);
    h.drain();

    h.panel.clear();
    assert_eq!(h.drain(), 1);
    assert_eq!(h.panel.buffer_len(), 0);
    assert!(h.canvas.visible_text().is_empty());
}

#[tokio::test]
async fn test_disabled_output_paints_nothing() {
    let mut h = Harness::new(PanelOptions {
        mode: IMMEDIATE,
        output_enabled: false,
        ..PanelOptions::default()
    });

    h.panel.add_message("Nobody is watching.");
    h.panel.force_render();
    assert_eq!(h.drain(), 0);
    assert_eq!(h.panel.buffer_len(), 1);
    assert_eq!(h.panel.stats().posted, 0);
}

#[tokio::test]
async fn test_external_callback_replaces_render() {
    let mut h = Harness::immediate();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    h.panel
        .set_external_render_callback(Some(Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })));

    h.panel.add_message("Handled elsewhere.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.drain(), 0);

    h.panel.set_external_render_callback(None);
    h.panel.add_message("Back to normal.");
    assert_eq!(h.drain(), 1);
}

#[tokio::test]
async fn test_geometry_change_forces_full_layout() {
    let mut h = Harness::immediate();
    h.panel.add_message("Stable.");
    h.drain();

    h.panel.set_geometry(PanelGeometry::new(0, 0, 60, 20));
    h.panel.trigger_render();
    assert_eq!(h.drain(), 1);
    assert_eq!(h.title().as_deref(), Some(PanelOptions::DEFAULT_GAME_TITLE));
}

#[tokio::test]
async fn test_full_buffer_still_repaints() {
    let mut h = Harness::small(3);
    h.panel.add_messages(["a", "b", "c"]);
    h.drain();

    h.panel.add_message("d");
    assert_eq!(h.drain(), 1);
    assert_eq!(h.canvas.visible_text(), ["b", "c", "d"]);
    assert_eq!(h.panel.stats().skipped, 0);
}

#[tokio::test]
async fn test_forced_render_during_paint_is_replayed() {
    let mut h = Harness::immediate();
    h.panel.add_message("The torch gutters.");
    assert_eq!(h.panel.stats().posted, 1);

    // The first paint job has not run yet, so this one is dropped.
    h.panel.force_render();
    assert_eq!(h.panel.stats().dropped, 1);

    assert_eq!(h.drain(), 2);
    let stats = h.panel.stats();
    assert_eq!(stats.performed, 2);
    assert_eq!(stats.skipped, 0);
}

#[tokio::test]
async fn test_force_full_layout_repaints_title() {
    let mut h = Harness::immediate();
    h.panel.add_message("Nothing stirs.");
    h.drain();
    let title_writes =
        |canvas: &RecordingCanvas| canvas.writes().iter().filter(|w| w.y == 0).count();
    let before = title_writes(&h.canvas);

    h.panel.force_full_layout_render();
    assert_eq!(h.drain(), 1);
    assert_eq!(title_writes(&h.canvas), before + 1);
    assert_eq!(h.title().as_deref(), Some(PanelOptions::DEFAULT_GAME_TITLE));
    assert_eq!(h.canvas.visible_text(), ["Nothing stirs."]);
}

#[tokio::test]
async fn test_scroll_down_past_end_clamps_and_pins() {
    let mut h = Harness::small(100);
    h.panel.add_messages(lines(8));
    h.drain();

    h.panel.scroll_up(3);
    h.drain();
    assert_eq!(h.canvas.visible_text()[0], "line 0");

    h.panel.scroll_down(100);
    assert_eq!(h.drain(), 1);
    assert_eq!(h.panel.scroll_metrics().offset, 3);
    assert_eq!(h.canvas.visible_text()[0], "line 3");

    // Still pinned at the old bottom, not following.
    h.panel.add_message("line 8");
    h.drain();
    assert_eq!(h.canvas.visible_text()[0], "line 3");
    assert!(h.panel.with_buffer(|buffer| buffer.scroll().is_manual()));
}
