//! In-memory battle record store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use battle_core::{
    AchievementId, AchievementProgress, Encounter, EncounterId, GameId, PlayerId,
    ProgressionRecord, RoundRecord, Verdict,
};

use crate::repository::traits::{
    AchievementRepository, EncounterRepository, FinalizeCommit, FinalizeStore, NewEncounter,
    ProgressionRepository, RoundRepository,
};
use crate::repository::{RepositoryError, Result};

#[derive(Default)]
struct Tables {
    last_encounter: u64,
    encounters: HashMap<EncounterId, Encounter>,
    rounds: HashMap<EncounterId, Vec<RoundRecord>>,
    progression: HashMap<PlayerId, ProgressionRecord>,
    achievements: HashMap<(PlayerId, AchievementId), AchievementProgress>,
}

impl Tables {
    fn ranked(&self) -> Vec<&ProgressionRecord> {
        let mut records: Vec<&ProgressionRecord> = self.progression.values().collect();
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.wins.cmp(&a.wins))
                .then(a.player.cmp(&b.player))
        });
        records
    }
}

/// Implements every record repository over one lock.
///
/// Guarded updates and [`FinalizeStore::commit_finalize`] run under a single
/// write guard, so each of them is atomic with respect to all other calls.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        f(&mut tables)
    }
}

#[async_trait]
impl EncounterRepository for MemoryStore {
    async fn create_encounter(&self, header: NewEncounter) -> Result<Encounter> {
        self.write(|tables| {
            tables.last_encounter += 1;
            let encounter = Encounter::new(
                EncounterId(tables.last_encounter),
                header.owner,
                header.game,
                header.challenge,
                header.total_rounds,
                header.started_at,
            );
            tables.encounters.insert(encounter.id, encounter.clone());
            Ok(encounter)
        })
    }

    async fn encounter(&self, id: EncounterId) -> Result<Option<Encounter>> {
        self.read(|tables| tables.encounters.get(&id).cloned())
    }

    async fn conclude_encounter(
        &self,
        id: EncounterId,
        verdict: Verdict,
        player_wins: u32,
    ) -> Result<bool> {
        self.write(|tables| {
            let encounter = tables
                .encounters
                .get_mut(&id)
                .ok_or(RepositoryError::UnknownEncounter(id))?;
            if encounter.verdict.is_concluded() {
                return Ok(false);
            }
            encounter.verdict = verdict;
            encounter.player_wins = player_wins;
            Ok(true)
        })
    }

    async fn mark_reward_claimed(&self, id: EncounterId) -> Result<bool> {
        self.write(|tables| {
            let encounter = tables
                .encounters
                .get_mut(&id)
                .ok_or(RepositoryError::UnknownEncounter(id))?;
            if encounter.reward_claimed {
                return Ok(false);
            }
            encounter.reward_claimed = true;
            Ok(true)
        })
    }

    async fn release_reward_claim(&self, id: EncounterId) -> Result<()> {
        self.write(|tables| {
            let encounter = tables
                .encounters
                .get_mut(&id)
                .ok_or(RepositoryError::UnknownEncounter(id))?;
            encounter.reward_claimed = false;
            Ok(())
        })
    }

    async fn encounters_for_game(&self, game: GameId) -> Result<Vec<Encounter>> {
        self.read(|tables| {
            let mut encounters: Vec<Encounter> = tables
                .encounters
                .values()
                .filter(|encounter| encounter.game == game)
                .cloned()
                .collect();
            encounters.sort_by_key(|encounter| encounter.id);
            encounters
        })
    }
}

#[async_trait]
impl RoundRepository for MemoryStore {
    async fn append_round(&self, round: &RoundRecord) -> Result<()> {
        self.write(|tables| {
            let total = tables
                .encounters
                .get(&round.encounter)
                .ok_or(RepositoryError::UnknownEncounter(round.encounter))?
                .total_rounds;
            let stored = tables.rounds.entry(round.encounter).or_default();

            let expected = stored.len() as u32 + 1;
            if round.index != expected {
                return Err(RepositoryError::RoundOutOfOrder {
                    encounter: round.encounter,
                    expected,
                    found: round.index,
                });
            }
            if round.index > total {
                return Err(RepositoryError::RoundOverflow {
                    encounter: round.encounter,
                    index: round.index,
                    total,
                });
            }

            stored.push(round.clone());
            Ok(())
        })
    }

    async fn rounds(&self, encounter: EncounterId) -> Result<Vec<RoundRecord>> {
        self.read(|tables| tables.rounds.get(&encounter).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ProgressionRepository for MemoryStore {
    async fn progression(&self, player: PlayerId) -> Result<Option<ProgressionRecord>> {
        self.read(|tables| tables.progression.get(&player).cloned())
    }

    async fn top(&self, limit: usize) -> Result<Vec<ProgressionRecord>> {
        self.read(|tables| {
            let mut records = tables.ranked();
            records.truncate(limit);
            records.into_iter().cloned().collect()
        })
    }

    async fn rank(&self, player: PlayerId) -> Result<Option<u32>> {
        self.read(|tables| {
            tables
                .ranked()
                .iter()
                .position(|record| record.player == player)
                .map(|index| index as u32 + 1)
        })
    }
}

#[async_trait]
impl AchievementRepository for MemoryStore {
    async fn achievement_progress(&self, player: PlayerId) -> Result<Vec<AchievementProgress>> {
        self.read(|tables| {
            let mut rows: Vec<AchievementProgress> = tables
                .achievements
                .values()
                .filter(|row| row.player == player)
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.achievement);
            rows
        })
    }
}

#[async_trait]
impl FinalizeStore for MemoryStore {
    async fn commit_finalize(&self, commit: FinalizeCommit) -> Result<bool> {
        self.write(|tables| {
            let encounter = tables
                .encounters
                .get_mut(&commit.encounter)
                .ok_or(RepositoryError::UnknownEncounter(commit.encounter))?;
            if encounter.finalized {
                return Ok(false);
            }
            encounter.finalized = true;

            let update = commit.update;
            for row in update.progress {
                tables.achievements.insert((row.player, row.achievement), row);
            }
            tables
                .progression
                .insert(update.progression.player, update.progression);
            Ok(true)
        })
    }
}
