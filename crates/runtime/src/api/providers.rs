//! Collaborator traits for world data the runtime reads but does not own.
//!
//! Deployments plug in implementations backed by their account system and
//! content store; [`crate::repository::MemoryWorld`] implements all of them.
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{Card, CardId, Challenge, ChallengeId, CollectionCard, GameId, PlayerId, Timestamp};

use super::errors::Result;

/// Supplies the player's ordered deck for a game.
#[async_trait]
pub trait LoadoutProvider: Send + Sync {
    /// Returns `None` if no deck has been selected.
    async fn loadout(&self, game: GameId) -> Result<Option<Vec<Card>>>;
}

/// Supplies predefined opponent lineups.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    async fn challenge(&self, id: ChallengeId) -> Result<Option<Challenge>>;
}

/// Decides whether a player may act on a game.
///
/// Unknown games are reported as unauthorized so callers cannot discover
/// other players' games.
#[async_trait]
pub trait SessionAuthorizer: Send + Sync {
    async fn authorize(&self, player: PlayerId, game: GameId) -> Result<bool>;
}

/// Records liveness of a game (heartbeats, completed battles).
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    async fn record_activity(&self, game: GameId, at: Timestamp) -> Result<()>;
}

/// Player-owned cards that rewards are applied to.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn collection_card(&self, game: GameId, card: CardId) -> Result<Option<CollectionCard>>;

    async fn save_collection_card(&self, game: GameId, card: &CollectionCard) -> Result<()>;
}

/// Bundle of collaborator handles.
#[derive(Clone)]
pub struct Providers {
    pub loadouts: Arc<dyn LoadoutProvider>,
    pub challenges: Arc<dyn ChallengeProvider>,
    pub authorizer: Arc<dyn SessionAuthorizer>,
    pub activity: Arc<dyn ActivityRecorder>,
    pub collection: Arc<dyn CollectionRepository>,
}

impl Providers {
    /// Serve every collaborator from one implementation.
    pub fn from_world<W>(world: Arc<W>) -> Self
    where
        W: LoadoutProvider
            + ChallengeProvider
            + SessionAuthorizer
            + ActivityRecorder
            + CollectionRepository
            + 'static,
    {
        Self {
            loadouts: world.clone(),
            challenges: world.clone(),
            authorizer: world.clone(),
            activity: world.clone(),
            collection: world,
        }
    }
}
