//! Game context seen by the display pipeline.
//!
//! The pipeline never owns game objects. It resolves the current character,
//! enemy, dungeon and room through a [`ContextProvider`] once per render cycle
//! and compares them by opaque id.

use std::sync::Arc;

use parking_lot::RwLock;

/// Opaque identity of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u64);

/// Opaque identity of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u64);

/// An enemy together with the character it is fighting, if known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemyRef {
    pub id: EnemyId,
    pub owner: Option<CharacterId>,
}

impl EnemyRef {
    pub fn new(id: EnemyId, owner: Option<CharacterId>) -> Self {
        Self { id, owner }
    }
}

/// Read-only view of the game state the panel depends on.
pub trait ContextProvider: Send + Sync {
    fn current_character(&self) -> Option<CharacterId>;
    fn current_enemy(&self) -> Option<EnemyRef>;
    fn dungeon_name(&self) -> Option<String>;
    fn room_name(&self) -> Option<String>;
}

/// Answers whether a character is the one currently shown on screen.
pub trait ActiveCharacterOracle: Send + Sync {
    fn is_active(&self, character: CharacterId) -> bool;
}

impl<T: ContextProvider + ?Sized> ContextProvider for Arc<T> {
    fn current_character(&self) -> Option<CharacterId> {
        (**self).current_character()
    }

    fn current_enemy(&self) -> Option<EnemyRef> {
        (**self).current_enemy()
    }

    fn dungeon_name(&self) -> Option<String> {
        (**self).dungeon_name()
    }

    fn room_name(&self) -> Option<String> {
        (**self).room_name()
    }
}

impl<T: ActiveCharacterOracle + ?Sized> ActiveCharacterOracle for Arc<T> {
    fn is_active(&self, character: CharacterId) -> bool {
        (**self).is_active(character)
    }
}

/// Returns the enemy only when it belongs to the active character.
///
/// An enemy without an explicit owner is attributed to the current character.
/// A background character's fight must never leak into the active display.
pub fn isolate_enemy(
    enemy: Option<EnemyRef>,
    character: Option<CharacterId>,
    oracle: &dyn ActiveCharacterOracle,
) -> Option<EnemyRef> {
    let enemy = enemy?;
    match enemy.owner.or(character) {
        Some(owner) if !oracle.is_active(owner) => None,
        _ => Some(enemy),
    }
}

/// Empty context: no character, no enemy, no location. Every character counts as active.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ContextProvider for NoContext {
    fn current_character(&self) -> Option<CharacterId> {
        None
    }

    fn current_enemy(&self) -> Option<EnemyRef> {
        None
    }

    fn dungeon_name(&self) -> Option<String> {
        None
    }

    fn room_name(&self) -> Option<String> {
        None
    }
}

impl ActiveCharacterOracle for NoContext {
    fn is_active(&self, _character: CharacterId) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
struct StaticState {
    character: Option<CharacterId>,
    enemy: Option<EnemyRef>,
    dungeon: Option<String>,
    room: Option<String>,
    /// `None` means the current character is the only active one.
    active: Option<Vec<CharacterId>>,
}

/// A settable context provider and oracle.
///
/// Used by tests and headless callers that drive the panel without a game.
#[derive(Debug, Default)]
pub struct StaticContext {
    state: RwLock<StaticState>,
}

impl StaticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_character(&self, character: Option<CharacterId>) {
        self.state.write().character = character;
    }

    pub fn set_enemy(&self, enemy: Option<EnemyRef>) {
        self.state.write().enemy = enemy;
    }

    pub fn set_dungeon(&self, dungeon: Option<&str>) {
        self.state.write().dungeon = dungeon.map(str::to_string);
    }

    pub fn set_room(&self, room: Option<&str>) {
        self.state.write().room = room.map(str::to_string);
    }

    /// Overrides the set of active characters.
    pub fn set_active(&self, active: Vec<CharacterId>) {
        self.state.write().active = Some(active);
    }
}

impl ContextProvider for StaticContext {
    fn current_character(&self) -> Option<CharacterId> {
        self.state.read().character
    }

    fn current_enemy(&self) -> Option<EnemyRef> {
        self.state.read().enemy
    }

    fn dungeon_name(&self) -> Option<String> {
        self.state.read().dungeon.clone()
    }

    fn room_name(&self) -> Option<String> {
        self.state.read().room.clone()
    }
}

impl ActiveCharacterOracle for StaticContext {
    fn is_active(&self, character: CharacterId) -> bool {
        let state = self.state.read();
        match &state.active {
            Some(active) => active.contains(&character),
            None => state.character == Some(character),
        }
    }
}
