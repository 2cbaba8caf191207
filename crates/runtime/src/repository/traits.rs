//! Repository contracts for encounter, round and progression records.
//!
//! Every write that must happen at most once is expressed as a guarded update:
//! the implementation checks the guard and performs the write under the same
//! lock or transaction, and reports whether it applied.

use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{
    AchievementProgress, ChallengeId, Encounter, EncounterId, GameId, PlayerId, ProgressionRecord,
    ProgressionUpdate, RoundRecord, Timestamp, Verdict,
};

use super::error::Result;
use super::memory::MemoryStore;

/// Header fields of an encounter about to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEncounter {
    pub owner: PlayerId,
    pub game: GameId,
    pub challenge: ChallengeId,
    pub total_rounds: u32,
    pub started_at: Timestamp,
}

/// Repository for encounter headers.
#[async_trait]
pub trait EncounterRepository: Send + Sync {
    /// Create an encounter with a fresh id and a pending verdict.
    async fn create_encounter(&self, header: NewEncounter) -> Result<Encounter>;

    async fn encounter(&self, id: EncounterId) -> Result<Option<Encounter>>;

    /// Write the verdict if the encounter is still pending.
    ///
    /// Returns `false` without writing if a verdict already exists.
    async fn conclude_encounter(
        &self,
        id: EncounterId,
        verdict: Verdict,
        player_wins: u32,
    ) -> Result<bool>;

    /// Flip `reward_claimed` from false to true.
    ///
    /// Returns `false` if the flag was already set.
    async fn mark_reward_claimed(&self, id: EncounterId) -> Result<bool>;

    /// Clear `reward_claimed` after a claim whose card write failed.
    async fn release_reward_claim(&self, id: EncounterId) -> Result<()>;

    /// Encounters played in a game, oldest first.
    async fn encounters_for_game(&self, game: GameId) -> Result<Vec<Encounter>>;
}

/// Append-only store of resolved rounds.
#[async_trait]
pub trait RoundRepository: Send + Sync {
    /// Append the next round of an encounter.
    ///
    /// Rejects indices that are not exactly one past the last stored round.
    async fn append_round(&self, round: &RoundRecord) -> Result<()>;

    /// Rounds of an encounter ordered by index.
    async fn rounds(&self, encounter: EncounterId) -> Result<Vec<RoundRecord>>;
}

#[async_trait]
pub trait ProgressionRepository: Send + Sync {
    async fn progression(&self, player: PlayerId) -> Result<Option<ProgressionRecord>>;

    /// Up to `limit` records ordered by score, then wins, both descending.
    /// Remaining ties go to the lower player id.
    async fn top(&self, limit: usize) -> Result<Vec<ProgressionRecord>>;

    /// 1-based position of `player` in the same ordering as [`top`](Self::top).
    async fn rank(&self, player: PlayerId) -> Result<Option<u32>>;
}

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    async fn achievement_progress(&self, player: PlayerId) -> Result<Vec<AchievementProgress>>;
}

/// Everything one finalize writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeCommit {
    pub encounter: EncounterId,
    pub update: ProgressionUpdate,
}

/// Atomic finalize write.
#[async_trait]
pub trait FinalizeStore: Send + Sync {
    /// Set the encounter's `finalized` flag and write the progression record
    /// and progress rows as one unit.
    ///
    /// Returns `false` and writes nothing if the encounter was already
    /// finalized.
    async fn commit_finalize(&self, commit: FinalizeCommit) -> Result<bool>;
}

/// Bundle of repository handles shared by the executor, ledger and service.
#[derive(Clone)]
pub struct Repositories {
    pub encounters: Arc<dyn EncounterRepository>,
    pub rounds: Arc<dyn RoundRepository>,
    pub progression: Arc<dyn ProgressionRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub finalize: Arc<dyn FinalizeStore>,
}

impl Repositories {
    /// Serve every repository from one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: EncounterRepository
            + RoundRepository
            + ProgressionRepository
            + AchievementRepository
            + FinalizeStore
            + 'static,
    {
        Self {
            encounters: store.clone(),
            rounds: store.clone(),
            progression: store.clone(),
            achievements: store.clone(),
            finalize: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }
}
