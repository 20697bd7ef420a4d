//! Shared in-memory game world for the demo.
//!
//! Producers mutate it from background tasks; the panel reads it through
//! [`ContextProvider`] and [`ActiveCharacterOracle`] when diffing renders.
//! Like a real game, the "current enemy" is a single slot that whichever
//! character last started a fight writes to. The active-character check is
//! what keeps a background fight off the active player's panel.

use lorepane_core::{ActiveCharacterOracle, CharacterId, ContextProvider, EnemyRef};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct WorldState {
    active: Option<CharacterId>,
    enemy: Option<EnemyRef>,
    dungeon: Option<String>,
    room: Option<String>,
}

#[derive(Debug, Default)]
pub struct DemoWorld {
    state: RwLock<WorldState>,
}

impl DemoWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a world with `character` in control.
    pub fn with_active(character: CharacterId) -> Self {
        let world = Self::new();
        world.set_active(Some(character));
        world
    }

    pub fn set_active(&self, character: Option<CharacterId>) {
        self.state.write().active = character;
    }

    pub fn active(&self) -> Option<CharacterId> {
        self.state.read().active
    }

    /// Starts a fight; the enemy slot now belongs to `enemy.owner`.
    pub fn engage(&self, enemy: EnemyRef) {
        self.state.write().enemy = Some(enemy);
    }

    /// Ends `owner`'s fight. Someone else's enemy is left alone.
    pub fn disengage(&self, owner: CharacterId) {
        let mut state = self.state.write();
        if state.enemy.is_some_and(|enemy| enemy.owner == Some(owner)) {
            state.enemy = None;
        }
    }

    pub fn enter_dungeon(&self, name: &str) {
        let mut state = self.state.write();
        state.dungeon = Some(name.to_string());
        state.room = None;
    }

    pub fn enter_room(&self, name: &str) {
        self.state.write().room = Some(name.to_string());
    }

    pub fn leave_dungeon(&self) {
        let mut state = self.state.write();
        state.dungeon = None;
        state.room = None;
    }
}

impl ContextProvider for DemoWorld {
    fn current_character(&self) -> Option<CharacterId> {
        self.state.read().active
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

impl ActiveCharacterOracle for DemoWorld {
    fn is_active(&self, character: CharacterId) -> bool {
        self.state.read().active == Some(character)
    }
}
