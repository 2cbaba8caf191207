//! In-memory world: games, collections, decks and challenges.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use battle_core::{
    Card, CardId, Challenge, ChallengeId, CollectionCard, GameId, PlayerId, Timestamp,
};

use crate::api::{
    ActivityRecorder, ChallengeProvider, CollectionRepository, LoadoutProvider, Result,
    SessionAuthorizer,
};
use crate::repository::RepositoryError;

/// One player's game inside the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub owner: PlayerId,
    pub collection: BTreeMap<CardId, CollectionCard>,
    /// Ordered deck as collection card ids. `None` until a deck is chosen.
    pub deck: Option<Vec<CardId>>,
    pub last_activity: Option<Timestamp>,
}

impl GameRecord {
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            collection: BTreeMap::new(),
            deck: None,
            last_activity: None,
        }
    }
}

#[derive(Default)]
struct WorldState {
    games: HashMap<GameId, GameRecord>,
    challenges: HashMap<ChallengeId, Challenge>,
}

/// Implements every collaborator trait over in-memory maps.
#[derive(Default)]
pub struct MemoryWorld {
    state: RwLock<WorldState>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_game(&self, id: GameId, game: GameRecord) -> Result<()> {
        self.write(|state| {
            state.games.insert(id, game);
        })
    }

    pub fn insert_challenge(&self, challenge: Challenge) -> Result<()> {
        self.write(|state| {
            state.challenges.insert(challenge.id, challenge);
        })
    }

    pub fn game(&self, id: GameId) -> Result<Option<GameRecord>> {
        self.read(|state| state.games.get(&id).cloned())
    }

    pub fn challenges(&self) -> Result<Vec<Challenge>> {
        self.read(|state| {
            let mut challenges: Vec<Challenge> = state.challenges.values().cloned().collect();
            challenges.sort_by_key(|challenge| challenge.id);
            challenges
        })
    }

    fn read<T>(&self, f: impl FnOnce(&WorldState) -> T) -> Result<T> {
        let state = self
            .state
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut WorldState) -> T) -> Result<T> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl LoadoutProvider for MemoryWorld {
    async fn loadout(&self, game: GameId) -> Result<Option<Vec<Card>>> {
        let resolved = self.read(|state| {
            let Some(record) = state.games.get(&game) else {
                return Ok(None);
            };
            let Some(deck) = &record.deck else {
                return Ok(None);
            };
            deck.iter()
                .map(|id| {
                    record
                        .collection
                        .get(id)
                        .map(CollectionCard::to_card)
                        .ok_or_else(|| {
                            RepositoryError::CorruptedData(format!(
                                "deck of game {game} references missing card {id}"
                            ))
                        })
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Some)
        })?;
        Ok(resolved?)
    }
}

#[async_trait]
impl ChallengeProvider for MemoryWorld {
    async fn challenge(&self, id: ChallengeId) -> Result<Option<Challenge>> {
        self.read(|state| state.challenges.get(&id).cloned())
    }
}

#[async_trait]
impl SessionAuthorizer for MemoryWorld {
    async fn authorize(&self, player: PlayerId, game: GameId) -> Result<bool> {
        self.read(|state| {
            state
                .games
                .get(&game)
                .is_some_and(|record| record.owner == player)
        })
    }
}

#[async_trait]
impl ActivityRecorder for MemoryWorld {
    async fn record_activity(&self, game: GameId, at: Timestamp) -> Result<()> {
        self.write(|state| {
            if let Some(record) = state.games.get_mut(&game) {
                record.last_activity = Some(at);
            }
        })
    }
}

#[async_trait]
impl CollectionRepository for MemoryWorld {
    async fn collection_card(&self, game: GameId, card: CardId) -> Result<Option<CollectionCard>> {
        self.read(|state| {
            state
                .games
                .get(&game)
                .and_then(|record| record.collection.get(&card).cloned())
        })
    }

    async fn save_collection_card(&self, game: GameId, card: &CollectionCard) -> Result<()> {
        let saved = self.write(|state| {
            state
                .games
                .get_mut(&game)
                .map(|record| record.collection.insert(card.id, card.clone()))
                .is_some()
        })?;
        if !saved {
            return Err(RepositoryError::CorruptedData(format!(
                "card {} saved to unknown game {game}",
                card.id
            ))
            .into());
        }
        Ok(())
    }
}
