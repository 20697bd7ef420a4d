//! Key handling for the demo.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use lorepane_core::display::ModeKind;
use lorepane_core::{Message, MessageKind, Style};

use crate::state::DemoState;

const MENU_ENTRIES: &[(&str, &str)] = &[
    ("PgUp/PgDn", "scroll a page"),
    ("Up/Down", "scroll a few rows"),
    ("End", "follow new messages"),
    ("c", "toggle combat pacing"),
    ("m", "show this menu"),
    ("q", "quit"),
];

/// Applies one key press to the panel.
pub fn handle_key(state: &mut DemoState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
        }
        KeyCode::Char('q') | KeyCode::Esc => state.should_quit = true,
        KeyCode::PageUp => state.panel.scroll_up(state.page_rows()),
        KeyCode::PageDown => state.panel.scroll_down(state.page_rows()),
        KeyCode::Up => state.panel.scroll_up(state.scroll_step),
        KeyCode::Down => state.panel.scroll_down(state.scroll_step),
        KeyCode::End => state.panel.reset_scroll(),
        KeyCode::Char('c') => toggle_combat(state),
        KeyCode::Char('m') => show_menu(state),
        _ => {}
    }
}

fn toggle_combat(state: &DemoState) {
    let next = if state.mode_kind() == ModeKind::Combat {
        ModeKind::Standard
    } else {
        ModeKind::Combat
    };
    state.panel.set_mode(state.modes.mode(next));
}

fn show_menu(state: &DemoState) {
    state.panel.set_mode(state.modes.mode(ModeKind::Menu));
    state
        .panel
        .add_message_kind(Message::styled("KEYS", Style::Header), MessageKind::Menu);
    for &(key, action) in MENU_ENTRIES {
        let entry = Message::styled(format!("{key:>10}"), Style::MenuKey)
            .with(format!("  {action}"), Style::Menu);
        state.panel.add_message_kind(entry, MessageKind::Menu);
    }
}
