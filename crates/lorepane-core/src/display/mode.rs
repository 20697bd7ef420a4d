//! Display modes: per-context timing and behavior policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Category of a display mode. Switching between categories cancels
/// in-flight render timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Standard,
    Combat,
    Menu,
}

impl ModeKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModeKind::Standard => "standard",
            ModeKind::Combat => "combat",
            ModeKind::Menu => "menu",
        }
    }

    /// Selects the mode category for a game context.
    pub fn for_context(context: GameContext) -> Self {
        match context {
            GameContext::Combat => ModeKind::Combat,
            GameContext::Exploration | GameContext::Dungeon => ModeKind::Standard,
            GameContext::MainMenu
            | GameContext::Inventory
            | GameContext::Settings
            | GameContext::Death => ModeKind::Menu,
        }
    }
}

/// Where the game currently is, as far as the panel cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameContext {
    MainMenu,
    Inventory,
    Settings,
    Exploration,
    Dungeon,
    Combat,
    Death,
}

/// Immutable timing/behavior policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub kind: ModeKind,
    /// Quiet window before a burst of triggers produces one render.
    pub debounce_ms: u64,
    /// Minimum spacing between two renders.
    pub min_render_delay_ms: u64,
    /// Follow the newest content when not manually scrolled.
    pub auto_scroll: bool,
    /// Wipe the whole panel on a major state change.
    pub clear_on_state_change: bool,
}

impl DisplayMode {
    /// Exploration, narrative and dungeon text.
    pub const STANDARD: DisplayMode = DisplayMode {
        kind: ModeKind::Standard,
        debounce_ms: 8,
        min_render_delay_ms: 0,
        auto_scroll: true,
        clear_on_state_change: true,
    };

    /// Batched combat output. Keeps the previous fight on screen.
    pub const COMBAT: DisplayMode = DisplayMode {
        kind: ModeKind::Combat,
        debounce_ms: 50,
        min_render_delay_ms: 0,
        auto_scroll: true,
        clear_on_state_change: false,
    };

    /// Instant menu rendering, shown from the top.
    pub const MENU: DisplayMode = DisplayMode {
        kind: ModeKind::Menu,
        debounce_ms: 0,
        min_render_delay_ms: 0,
        auto_scroll: false,
        clear_on_state_change: true,
    };

    /// Canonical mode for a category.
    pub fn of_kind(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Standard => Self::STANDARD,
            ModeKind::Combat => Self::COMBAT,
            ModeKind::Menu => Self::MENU,
        }
    }

    /// Selects the canonical mode for a game context.
    pub fn for_context(context: GameContext) -> Self {
        Self::of_kind(ModeKind::for_context(context))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_render_delay(&self) -> Duration {
        Duration::from_millis(self.min_render_delay_ms)
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Overrides for one display mode. Unset fields keep the canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_render_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scroll: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_on_state_change: Option<bool>,
}

impl ModeSettings {
    fn apply(self, base: DisplayMode) -> DisplayMode {
        DisplayMode {
            kind: base.kind,
            debounce_ms: self.debounce_ms.unwrap_or(base.debounce_ms),
            min_render_delay_ms: self.min_render_delay_ms.unwrap_or(base.min_render_delay_ms),
            auto_scroll: self.auto_scroll.unwrap_or(base.auto_scroll),
            clear_on_state_change: self
                .clear_on_state_change
                .unwrap_or(base.clear_on_state_change),
        }
    }
}

/// The `[modes]` config table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModesConfig {
    pub standard: ModeSettings,
    pub combat: ModeSettings,
    pub menu: ModeSettings,
}

impl ModesConfig {
    /// Configured mode for a category.
    pub fn mode(&self, kind: ModeKind) -> DisplayMode {
        let settings = match kind {
            ModeKind::Standard => self.standard,
            ModeKind::Combat => self.combat,
            ModeKind::Menu => self.menu,
        };
        settings.apply(DisplayMode::of_kind(kind))
    }

    /// Configured mode for a game context.
    pub fn for_context(&self, context: GameContext) -> DisplayMode {
        self.mode(ModeKind::for_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_values() {
        assert_eq!(DisplayMode::STANDARD.debounce(), Duration::from_millis(8));
        assert_eq!(DisplayMode::COMBAT.debounce_ms, 50);
        assert!(!DisplayMode::COMBAT.clear_on_state_change);
        assert_eq!(DisplayMode::MENU.debounce_ms, 0);
        assert!(!DisplayMode::MENU.auto_scroll);
    }

    #[test]
    fn test_context_selection() {
        assert_eq!(DisplayMode::for_context(GameContext::Combat), DisplayMode::COMBAT);
        assert_eq!(DisplayMode::for_context(GameContext::Dungeon), DisplayMode::STANDARD);
        assert_eq!(DisplayMode::for_context(GameContext::Death), DisplayMode::MENU);
        assert_eq!(DisplayMode::for_context(GameContext::Inventory).kind, ModeKind::Menu);
    }

    #[test]
    fn test_default_modes_config_matches_canonical() {
        let modes = ModesConfig::default();
        for kind in [ModeKind::Standard, ModeKind::Combat, ModeKind::Menu] {
            assert_eq!(modes.mode(kind), DisplayMode::of_kind(kind));
        }
    }

    #[test]
    fn test_overrides_keep_kind() {
        let modes: ModesConfig = toml::from_str("[combat]\ndebounce_ms = 80\n").unwrap();
        let combat = modes.for_context(GameContext::Combat);

        assert_eq!(combat.kind, ModeKind::Combat);
        assert_eq!(combat.debounce_ms, 80);
        assert!(!combat.clear_on_state_change);
        assert_eq!(modes.mode(ModeKind::Standard), DisplayMode::STANDARD);
    }
}
