//! Scripted producers that feed the panel from background tasks.
//!
//! The adventure task walks the hero through dungeons and fights; the rival
//! task runs a fight for a character who is not in control, which must never
//! show up in the hero's title or layout.

use std::sync::Arc;
use std::time::Duration;

use lorepane_core::display::{
    CenterPanelDisplayManager, GameContext, ModesConfig, RevealConfig,
};
use lorepane_core::{CharacterId, EnemyId, EnemyRef, Message, MessageKind, Style};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::world::DemoWorld;

pub const HERO: CharacterId = CharacterId(1);
pub const RIVAL: CharacterId = CharacterId(2);

/// Pause between combat turns.
pub const TURN_PACING: Duration = Duration::from_millis(700);

const DUNGEONS: &[(&str, &[&str])] = &[
    ("Sunken Keep", &["Flooded Hall", "Drowned Chapel"]),
    ("Ash Caverns", &["Cinder Gallery", "Obsidian Throne"]),
];

const ENEMIES: &[&str] = &["Goblin Scout", "Bone Warden", "Ember Wraith", "Cave Troll"];

const ROOM_TEXT: &str = "Water drips from a cracked vault. Rusted chains sway in a draft you cannot feel! Somewhere ahead, stone grinds against stone.";

const DUNGEON_BANNER: &str = "=====================
ENTERING THE DUNGEON
=====================
The air turns cold and still.
Stats: Health: 42  Attack: 9
Torches gutter as you pass.";

/// Everything the producers share.
#[derive(Clone)]
pub struct DemoContext {
    pub panel: CenterPanelDisplayManager,
    pub world: Arc<DemoWorld>,
    pub modes: ModesConfig,
    pub reveal: RevealConfig,
    pub cancel: CancellationToken,
}

/// Spawns the adventure and rival producers on the current runtime.
pub fn spawn_producers(ctx: &DemoContext) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(adventure(ctx.clone())),
        tokio::spawn(rival_fight(ctx.clone())),
    ]
}

/// Sleeps unless canceled first. Returns false on cancel.
async fn pause(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

async fn adventure(ctx: DemoContext) {
    ctx.panel.add_message_kind(
        Message::styled("Welcome, adventurer.", Style::Header),
        MessageKind::MainTitle,
    );

    let mut round = 0usize;
    loop {
        for &(dungeon, rooms) in DUNGEONS {
            ctx.world.enter_dungeon(dungeon);
            ctx.panel.set_mode(ctx.modes.for_context(GameContext::Dungeon));
            ctx.panel
                .write_chunked(DUNGEON_BANNER, &RevealConfig::dungeon());
            if !pause(&ctx.cancel, Duration::from_secs(2)).await {
                return;
            }

            for &room in rooms {
                ctx.world.enter_room(room);
                ctx.panel.add_message_kind(
                    Message::styled(format!("-- {room} --"), Style::Environment),
                    MessageKind::Environmental,
                );
                tokio::select! {
                    () = ctx.cancel.cancelled() => return,
                    () = ctx.panel.reveal_chunked_async(ROOM_TEXT, &ctx.reveal) => {}
                }

                let enemy = ENEMIES[round % ENEMIES.len()];
                if !fight(&ctx, round, enemy).await {
                    return;
                }
                round += 1;
            }
        }
        ctx.world.leave_dungeon();
    }
}

/// Plays one fight. Returns false when canceled.
async fn fight(ctx: &DemoContext, round: usize, enemy: &str) -> bool {
    let enemy_ref = EnemyRef::new(EnemyId(round as u64 + 100), Some(HERO));
    ctx.world.engage(enemy_ref);
    ctx.panel.set_mode(ctx.modes.for_context(GameContext::Combat));
    ctx.panel.add_message_kind(
        Message::styled("A foe appears: ", Style::Warning).with(enemy, Style::Enemy),
        MessageKind::Encounter,
    );

    let mut enemy_health = 12 + (round % 3) * 4;
    let mut turn = 0usize;
    while enemy_health > 0 {
        let lines = combat_turn(enemy, turn, &mut enemy_health);
        ctx.panel.add_message_batch_async(lines, Duration::ZERO).await;
        if !pause(&ctx.cancel, TURN_PACING).await {
            return false;
        }
        turn += 1;
    }

    let loot = ctx.panel.batch(true, |tx| {
        tx.add(Message::styled(format!("{enemy} is defeated."), Style::Header))?;
        tx.add(Message::styled("You find ", Style::Narrative).with(
            format!("{} gold", 5 + round * 3),
            Style::Loot,
        ))?;
        tx.add(Message::empty())
    });
    if let Err(err) = loot {
        tracing::debug!(%err, "loot batch rejected");
    }

    ctx.world.disengage(HERO);
    ctx.panel.set_mode(ctx.modes.for_context(GameContext::Dungeon));
    pause(&ctx.cancel, Duration::from_secs(1)).await
}

/// One exchange of blows; deterministic so runs are reproducible.
pub fn combat_turn(enemy: &str, turn: usize, enemy_health: &mut usize) -> Vec<Message> {
    let mut lines = Vec::with_capacity(3);

    let critical = turn % 4 == 3;
    let damage = if critical { 8 } else { 3 + turn % 3 };
    *enemy_health = enemy_health.saturating_sub(damage);
    let mut hit = Message::styled("You", Style::Player)
        .with(" strike ", Style::Narrative)
        .with(enemy, Style::Enemy)
        .with(" for ", Style::Narrative);
    hit.push(
        format!("{damage}"),
        if critical { Style::Critical } else { Style::Damage },
    );
    if critical {
        hit.push(" (critical!)", Style::Critical);
    }
    lines.push(hit);

    if *enemy_health == 0 {
        return lines;
    }

    if turn % 3 == 1 {
        lines.push(
            Message::styled(enemy, Style::Enemy).with(" swings and misses.", Style::Miss),
        );
    } else {
        lines.push(
            Message::styled(enemy, Style::Enemy)
                .with(" hits you for ", Style::Narrative)
                .with("2", Style::Damage),
        );
    }
    if turn % 5 == 4 {
        lines.push(Message::styled("You drink a potion: +6 health", Style::Heal));
    }
    lines
}

/// A fight owned by a character who is not in control.
async fn rival_fight(ctx: DemoContext) {
    let mut id = 900;
    loop {
        ctx.world.engage(EnemyRef::new(EnemyId(id), Some(RIVAL)));
        tracing::debug!(enemy = id, "background fight started");
        if !pause(&ctx.cancel, Duration::from_secs(5)).await {
            return;
        }
        ctx.world.disengage(RIVAL);
        if !pause(&ctx.cancel, Duration::from_secs(3)).await {
            return;
        }
        id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_turn_reduces_health() {
        let mut health = 12;
        let lines = combat_turn("Goblin Scout", 0, &mut health);

        assert_eq!(health, 9);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].plain_text(), "You strike Goblin Scout for 3");
    }

    #[test]
    fn test_killing_blow_ends_turn() {
        let mut health = 2;
        let lines = combat_turn("Goblin Scout", 3, &mut health);

        assert_eq!(health, 0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].plain_text().ends_with("(critical!)"));
    }

    #[test]
    fn test_fights_terminate() {
        for round in 0..6 {
            let mut health = 12 + (round % 3) * 4;
            let mut turns = 0;
            while health > 0 {
                combat_turn("Cave Troll", turns, &mut health);
                turns += 1;
            }
            assert!(turns < 10);
        }
    }
}
