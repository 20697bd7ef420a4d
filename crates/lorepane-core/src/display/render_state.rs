//! Snapshot diffing: decides whether and how much of the panel to repaint.

use crate::context::{ActiveCharacterOracle, CharacterId, ContextProvider, EnemyRef, isolate_enemy};

use super::buffer::DisplayBuffer;
use super::mode::DisplayMode;

/// What the panel looked like at the last paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub character: Option<CharacterId>,
    pub enemy: Option<EnemyRef>,
    pub dungeon_name: Option<String>,
    pub room_name: Option<String>,
    pub buffer_count: usize,
    pub buffer_revision: u64,
    pub scroll_offset: usize,
    pub is_manual_scrolling: bool,
    pub layout_initialized: bool,
}

/// Outcome of comparing the current context against the last snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub needs_render: bool,
    pub needs_full_layout: bool,
    pub is_major_state_change: bool,
    pub character: Option<CharacterId>,
    /// Already filtered by the active-character rule.
    pub enemy: Option<EnemyRef>,
    pub dungeon_name: Option<String>,
    pub room_name: Option<String>,
}

/// Owns the last [`RenderSnapshot`].
#[derive(Debug, Default)]
pub struct RenderStateManager {
    last: RenderSnapshot,
}

struct Resolved {
    character: Option<CharacterId>,
    enemy: Option<EnemyRef>,
    dungeon_name: Option<String>,
    room_name: Option<String>,
}

fn resolve(context: &dyn ContextProvider, oracle: &dyn ActiveCharacterOracle) -> Resolved {
    let character = context.current_character();
    Resolved {
        character,
        enemy: isolate_enemy(context.current_enemy(), character, oracle),
        dungeon_name: context.dungeon_name(),
        room_name: context.room_name(),
    }
}

impl RenderStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &RenderSnapshot {
        &self.last
    }

    /// Compares the live context and buffer against the last snapshot.
    pub fn get_render_state(
        &self,
        buffer: &DisplayBuffer,
        context: &dyn ContextProvider,
        oracle: &dyn ActiveCharacterOracle,
    ) -> RenderState {
        let now = resolve(context, oracle);
        let last = &self.last;
        let fresh = !last.layout_initialized;

        let character_changed = now.character != last.character;
        let enemy_changed = now.enemy.map(|e| e.id) != last.enemy.map(|e| e.id);
        let dungeon_changed = now.dungeon_name != last.dungeon_name;
        let room_changed = now.room_name != last.room_name;

        let needs_full_layout =
            fresh || character_changed || enemy_changed || dungeon_changed || room_changed;
        let is_major_state_change = fresh || character_changed || dungeon_changed;

        let scroll = buffer.scroll();
        let needs_render = needs_full_layout
            || buffer.len() != last.buffer_count
            || buffer.revision() != last.buffer_revision
            || scroll.raw_offset() != last.scroll_offset
            || scroll.is_manual() != last.is_manual_scrolling;

        RenderState {
            needs_render,
            needs_full_layout,
            is_major_state_change,
            character: now.character,
            enemy: now.enemy,
            dungeon_name: now.dungeon_name,
            room_name: now.room_name,
        }
    }

    /// Stores the post-paint snapshot.
    pub fn record_render(
        &mut self,
        buffer: &DisplayBuffer,
        context: &dyn ContextProvider,
        oracle: &dyn ActiveCharacterOracle,
    ) {
        let now = resolve(context, oracle);
        let scroll = buffer.scroll();
        self.last = RenderSnapshot {
            character: now.character,
            enemy: now.enemy,
            dungeon_name: now.dungeon_name,
            room_name: now.room_name,
            buffer_count: buffer.len(),
            buffer_revision: buffer.revision(),
            scroll_offset: scroll.raw_offset(),
            is_manual_scrolling: scroll.is_manual(),
            layout_initialized: true,
        };
    }

    /// Forgets the last paint; the next render is a full layout.
    pub fn reset(&mut self) {
        self.last = RenderSnapshot::default();
    }

    pub fn should_clear_canvas(state: &RenderState, mode: &DisplayMode) -> bool {
        mode.clear_on_state_change && state.is_major_state_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EnemyId, StaticContext};
    use crate::message::Message;

    const HERO: CharacterId = CharacterId(1);

    fn setup() -> (StaticContext, DisplayBuffer, RenderStateManager) {
        let ctx = StaticContext::new();
        ctx.set_character(Some(HERO));
        ctx.set_dungeon(Some("Crypt"));
        ctx.set_room(Some("Hall"));
        let mut buffer = DisplayBuffer::default();
        buffer.add(Message::plain("You enter the crypt."));
        let mut manager = RenderStateManager::new();
        manager.record_render(&buffer, &ctx, &ctx);
        (ctx, buffer, manager)
    }

    #[test]
    fn test_first_render_is_full_and_major() {
        let ctx = StaticContext::new();
        let state = RenderStateManager::new().get_render_state(&DisplayBuffer::default(), &ctx, &ctx);
        assert!(state.needs_render);
        assert!(state.needs_full_layout);
        assert!(state.is_major_state_change);
    }

    #[test]
    fn test_unchanged_state_needs_no_render() {
        let (ctx, buffer, manager) = setup();
        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(!state.needs_render);
        assert!(!state.needs_full_layout);
    }

    #[test]
    fn test_room_change_is_full_layout_but_not_major() {
        let (ctx, buffer, manager) = setup();
        ctx.set_room(Some("Ossuary"));

        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(state.needs_render);
        assert!(state.needs_full_layout);
        assert!(!state.is_major_state_change);
    }

    #[test]
    fn test_enemy_change_is_full_layout_but_not_major() {
        let (ctx, buffer, manager) = setup();
        ctx.set_enemy(Some(EnemyRef::new(EnemyId(9), Some(HERO))));

        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(state.needs_full_layout);
        assert!(!state.is_major_state_change);
    }

    #[test]
    fn test_character_or_dungeon_change_is_major() {
        let (ctx, buffer, manager) = setup();
        ctx.set_dungeon(Some("Tower"));
        assert!(manager.get_render_state(&buffer, &ctx, &ctx).is_major_state_change);

        ctx.set_dungeon(Some("Crypt"));
        ctx.set_character(Some(CharacterId(2)));
        assert!(manager.get_render_state(&buffer, &ctx, &ctx).is_major_state_change);
    }

    #[test]
    fn test_background_enemy_is_ignored() {
        let (ctx, buffer, manager) = setup();
        ctx.set_enemy(Some(EnemyRef::new(EnemyId(4), Some(CharacterId(77)))));

        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert_eq!(state.enemy, None);
        assert!(!state.needs_render);
    }

    #[test]
    fn test_count_and_scroll_changes_need_content_render() {
        let (ctx, mut buffer, mut manager) = setup();
        buffer.add(Message::plain("A rat squeaks."));
        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(state.needs_render);
        assert!(!state.needs_full_layout);

        manager.record_render(&buffer, &ctx, &ctx);
        buffer.scroll_up(1, 5);
        assert!(manager.get_render_state(&buffer, &ctx, &ctx).needs_render);
    }

    #[test]
    fn test_eviction_at_capacity_needs_render() {
        let ctx = StaticContext::new();
        let mut buffer = DisplayBuffer::with_capacity(2);
        buffer.add_range(["a", "b"].map(Message::from));
        let mut manager = RenderStateManager::new();
        manager.record_render(&buffer, &ctx, &ctx);

        buffer.add(Message::plain("c"));
        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(state.needs_render);
        assert!(!state.needs_full_layout);
    }

    #[test]
    fn test_reset_forces_full_layout() {
        let (ctx, buffer, mut manager) = setup();
        manager.reset();
        assert_eq!(manager.last(), &RenderSnapshot::default());
        let state = manager.get_render_state(&buffer, &ctx, &ctx);
        assert!(state.needs_full_layout);
        assert!(state.is_major_state_change);
    }

    #[test]
    fn test_clear_canvas_depends_on_mode() {
        let ctx = StaticContext::new();
        let state = RenderStateManager::new().get_render_state(&DisplayBuffer::default(), &ctx, &ctx);
        assert!(RenderStateManager::should_clear_canvas(&state, &DisplayMode::STANDARD));
        assert!(!RenderStateManager::should_clear_canvas(&state, &DisplayMode::COMBAT));
    }
}
