//! Shared fixture world for runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use battle_core::{
    Card, CardId, CardStats, Challenge, ChallengeId, ChallengeTier, CollectionCard, Element,
    GameId, PlayerId, StatKind, Timestamp,
};
use battle_runtime::{
    ActivityRecorder, BattleRuntime, GameRecord, MemoryWorld, PacingConfig, Providers, Result,
    ServerMessage, SessionContext, SessionHandle,
};

pub const OWNER: PlayerId = PlayerId(1);
pub const STRANGER: PlayerId = PlayerId(2);

/// One-card deck that beats [`SCOUT`] and loses to [`TROLL`].
pub const SOLO_GAME: GameId = GameId(1);
/// Game without a deck.
pub const EMPTY_GAME: GameId = GameId(2);
/// Game owned by [`STRANGER`].
pub const FOREIGN_GAME: GameId = GameId(3);
/// Four-card deck for [`MORIA`].
pub const PARTY_GAME: GameId = GameId(4);

pub const SCOUT: ChallengeId = ChallengeId(1);
pub const TROLL: ChallengeId = ChallengeId(2);
pub const MORIA: ChallengeId = ChallengeId(3);
pub const UNKNOWN_CHALLENGE: ChallengeId = ChallengeId(99);

pub const ARAGORN: CardId = CardId(1);

fn stats(power: u32, vitality: u32, element: Element) -> CardStats {
    CardStats::new(power, vitality, element)
}

fn game(owner: PlayerId, cards: &[(u64, &str, CardStats)], deck: Option<&[u64]>) -> GameRecord {
    let mut record = GameRecord::new(owner);
    for (id, name, stats) in cards {
        record
            .collection
            .insert(CardId(*id), CollectionCard::new(CardId(*id), *name, *stats));
    }
    record.deck = deck.map(|ids| ids.iter().copied().map(CardId).collect());
    record
}

pub fn world() -> Arc<MemoryWorld> {
    let world = MemoryWorld::new();

    world
        .insert_game(
            SOLO_GAME,
            game(
                OWNER,
                &[(1, "Aragorn", stats(5, 4, Element::Fire))],
                Some(&[1]),
            ),
        )
        .expect("insert solo game");
    world
        .insert_game(EMPTY_GAME, game(OWNER, &[], None))
        .expect("insert empty game");
    world
        .insert_game(
            FOREIGN_GAME,
            game(
                STRANGER,
                &[(1, "Boromir", stats(4, 4, Element::Air))],
                Some(&[1]),
            ),
        )
        .expect("insert foreign game");
    world
        .insert_game(
            PARTY_GAME,
            game(
                OWNER,
                &[
                    (1, "Frodo", stats(2, 5, Element::Earth)),
                    (2, "Sam", stats(3, 6, Element::Earth)),
                    (3, "Legolas", stats(5, 3, Element::Air)),
                    (4, "Gimli", stats(4, 7, Element::Earth)),
                ],
                Some(&[1, 2, 3, 4]),
            ),
        )
        .expect("insert party game");

    world
        .insert_challenge(Challenge {
            id: SCOUT,
            name: "Orc Scout".into(),
            tier: ChallengeTier::Skirmish,
            cards: vec![Card::base("Orc", stats(3, 6, Element::Earth))],
        })
        .expect("insert scout");
    world
        .insert_challenge(Challenge {
            id: TROLL,
            name: "Troll Bridge".into(),
            tier: ChallengeTier::Skirmish,
            cards: vec![Card::base("Cave Troll", stats(9, 9, Element::Water))],
        })
        .expect("insert troll");
    world
        .insert_challenge(Challenge {
            id: MORIA,
            name: "Mines of Moria".into(),
            tier: ChallengeTier::SmallDungeon,
            cards: vec![
                Card::base("Goblin", stats(2, 2, Element::Earth)),
                Card::base("Uruk", stats(4, 5, Element::Fire)),
                Card::base("Warg", stats(3, 3, Element::Air)),
                Card::leader("Balrog", stats(5, 6, Element::Fire), StatKind::Power),
            ],
        })
        .expect("insert moria");

    Arc::new(world)
}

pub fn runtime(world: &Arc<MemoryWorld>, pacing: PacingConfig) -> BattleRuntime {
    BattleRuntime::builder()
        .pacing(pacing)
        .providers(Providers::from_world(world.clone()))
        .build()
        .expect("runtime should build")
}

pub fn ctx(player: PlayerId, game: GameId, challenge: ChallengeId) -> SessionContext {
    SessionContext {
        player,
        game,
        challenge,
    }
}

/// Receive events until `battle-end`, an `error`, or the channel closes.
pub async fn collect_until_end(handle: &mut SessionHandle) -> Vec<ServerMessage> {
    let mut events = Vec::new();
    while let Some(event) = handle.outbound.recv().await {
        let done = matches!(
            event,
            ServerMessage::BattleEnd { .. } | ServerMessage::Error { .. }
        );
        events.push(event);
        if done {
            break;
        }
    }
    events
}

pub fn kinds(events: &[ServerMessage]) -> Vec<&'static str> {
    events.iter().map(ServerMessage::kind).collect()
}

/// Counts activity records, delegating to nothing.
#[derive(Default)]
pub struct CountingActivity {
    calls: AtomicUsize,
}

impl CountingActivity {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityRecorder for CountingActivity {
    async fn record_activity(&self, _game: GameId, _at: Timestamp) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
