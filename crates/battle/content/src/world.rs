//! World content as written in data files, and its resolved form.

use battle_core::{
    CardId, Challenge, ChallengeId, CollectionCard, Element, GameId, PlayerId, StatKind,
};

/// A plain world card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardSpec {
    pub name: String,
    pub power: u32,
    pub vitality: u32,
    pub element: Element,
}

/// A leader built on a world card, doubling one of its stats.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaderSpec {
    pub name: String,
    /// Name of the world card the leader is derived from.
    pub base: String,
    pub doubles: StatKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChallengeSpec {
    pub id: u64,
    pub name: String,
    /// Tier name, e.g. `"small-dungeon"`.
    pub tier: String,
    /// Card or leader names in battle order.
    pub cards: Vec<String>,
}

/// A player's starting game.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSpec {
    pub id: u64,
    pub owner: u64,
    /// World card names the collection starts with.
    pub collection: Vec<String>,
    /// Collection card names in battle order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deck: Option<Vec<String>>,
}

/// Top-level layout of a world file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSpec {
    pub cards: Vec<CardSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub leaders: Vec<LeaderSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub challenges: Vec<ChallengeSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub games: Vec<GameSpec>,
}

/// A game with its collection materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSeed {
    pub id: GameId,
    pub owner: PlayerId,
    /// Card ids are assigned from 1 in collection order.
    pub collection: Vec<CollectionCard>,
    pub deck: Option<Vec<CardId>>,
}

/// Resolved world content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    pub challenges: Vec<Challenge>,
    pub games: Vec<GameSeed>,
}

impl World {
    pub fn challenge(&self, id: ChallengeId) -> Option<&Challenge> {
        self.challenges.iter().find(|challenge| challenge.id == id)
    }

    pub fn game(&self, id: GameId) -> Option<&GameSeed> {
        self.games.iter().find(|game| game.id == id)
    }
}
