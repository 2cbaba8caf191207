//! Progression ledger: exactly-once finalize of concluded encounters.
//!
//! Finalize is reachable from two places, the session that played the battle
//! and the catch-up path of [`crate::api::BattleService`]. Both call
//! [`ProgressionLedger::finalize`], which serializes work per player and
//! commits through [`crate::repository::FinalizeStore::commit_finalize`]. An
//! encounter changes progression at most once however many callers race.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use battle_core::{
    AchievementCatalog, Encounter, EncounterId, Outcome, PlayerId, ProgressionRecord,
    ProgressionUpdate, apply_outcome,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{ResourceKind, Result, RuntimeError};
use crate::repository::{FinalizeCommit, Repositories};
use crate::utils;

/// Result of a finalize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// This call applied the encounter's outcome.
    Applied(ProgressionUpdate),
    /// The outcome had already been applied; nothing changed.
    AlreadyFinalized,
}

impl FinalizeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

pub struct ProgressionLedger {
    repos: Repositories,
    catalog: Arc<AchievementCatalog>,
    players: StdMutex<HashMap<PlayerId, Arc<Mutex<()>>>>,
}

impl ProgressionLedger {
    pub fn new(repos: Repositories, catalog: Arc<AchievementCatalog>) -> Self {
        Self {
            repos,
            catalog,
            players: StdMutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Apply a concluded encounter to its owner's progression exactly once.
    pub async fn finalize(&self, id: EncounterId) -> Result<FinalizeOutcome> {
        let encounter = self.load(id).await?;
        if encounter.finalized {
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }
        let outcome = encounter
            .verdict
            .outcome()
            .ok_or(RuntimeError::NotConcluded(id))?;

        let lock = self.player_lock(encounter.owner);
        let result = {
            let _guard = lock.lock().await;
            self.commit(&encounter, outcome).await
        };
        self.release_player_lock(encounter.owner, lock);
        result
    }

    /// Runs under the owner's lock.
    async fn commit(&self, encounter: &Encounter, outcome: Outcome) -> Result<FinalizeOutcome> {
        let id = encounter.id;
        // A racing finalize may have committed while we waited.
        if self.load(id).await?.finalized {
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }

        let record = self
            .repos
            .progression
            .progression(encounter.owner)
            .await?
            .unwrap_or_else(|| ProgressionRecord::new(encounter.owner));
        let progress = self
            .repos
            .achievements
            .achievement_progress(encounter.owner)
            .await?;

        let update = apply_outcome(&record, &progress, &self.catalog, outcome, utils::now());

        let committed = self
            .repos
            .finalize
            .commit_finalize(FinalizeCommit {
                encounter: id,
                update: update.clone(),
            })
            .await?;
        if !committed {
            debug!(target: "battle::ledger", encounter = %id, "Finalize lost the race");
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }

        info!(
            target: "battle::ledger",
            encounter = %id,
            player = %encounter.owner,
            ?outcome,
            streak = update.progression.current_streak,
            score = update.progression.score,
            unlocked = update.unlocked.len(),
            "Encounter finalized"
        );
        Ok(FinalizeOutcome::Applied(update))
    }

    async fn load(&self, id: EncounterId) -> Result<Encounter> {
        self.repos
            .encounters
            .encounter(id)
            .await?
            .ok_or_else(|| RuntimeError::not_found(ResourceKind::Encounter, id))
    }

    fn player_lock(&self, player: PlayerId) -> Arc<Mutex<()>> {
        let mut players = self
            .players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        players.entry(player).or_default().clone()
    }

    /// Drop the map entry once no other finalize holds or waits on it.
    fn release_player_lock(&self, player: PlayerId, lock: Arc<Mutex<()>>) {
        let mut players = self
            .players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map and one here.
        if Arc::strong_count(&lock) == 2 {
            players.remove(&player);
        }
    }

    #[cfg(test)]
    fn tracked_players(&self) -> usize {
        self.players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{Card, CardStats, ChallengeId, Element, GameId};

    use super::*;
    use crate::executor::{EncounterExecutor, EncounterParties};

    async fn concluded_win(repos: &Repositories) -> EncounterId {
        let card = Card::base("c", CardStats::new(9, 9, Element::Fire));
        let weak = Card::base("w", CardStats::new(1, 1, Element::Earth));
        EncounterExecutor::new(repos.clone())
            .resolve(
                EncounterParties {
                    owner: PlayerId(3),
                    game: GameId(1),
                    challenge: ChallengeId(1),
                },
                vec![card],
                vec![weak],
            )
            .await
            .unwrap()
            .id
    }

    fn ledger(repos: &Repositories) -> ProgressionLedger {
        ProgressionLedger::new(repos.clone(), Arc::new(AchievementCatalog::standard()))
    }

    #[tokio::test]
    async fn second_finalize_is_a_no_op() {
        let repos = Repositories::in_memory();
        let id = concluded_win(&repos).await;
        let ledger = ledger(&repos);

        assert!(ledger.finalize(id).await.unwrap().is_applied());
        assert_eq!(
            ledger.finalize(id).await.unwrap(),
            FinalizeOutcome::AlreadyFinalized
        );

        let record = repos.progression.progression(PlayerId(3)).await.unwrap().unwrap();
        assert_eq!(record.wins, 1);
        assert_eq!(record.score, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_finalizers_apply_once() {
        let repos = Repositories::in_memory();
        let id = concluded_win(&repos).await;
        let ledger = Arc::new(ledger(&repos));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.finalize(id).await.unwrap() })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_applied() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);

        let record = repos.progression.progression(PlayerId(3)).await.unwrap().unwrap();
        assert_eq!(record.wins, 1);
        assert_eq!(record.current_streak, 1);
        assert_eq!(ledger.tracked_players(), 0);
    }

    #[tokio::test]
    async fn player_locks_are_dropped_after_finalize() {
        let repos = Repositories::in_memory();
        let ledger = ledger(&repos);

        for _ in 0..3 {
            let id = concluded_win(&repos).await;
            ledger.finalize(id).await.unwrap();
            assert_eq!(ledger.tracked_players(), 0);
        }

        let record = repos.progression.progression(PlayerId(3)).await.unwrap().unwrap();
        assert_eq!(record.wins, 3);
    }

    #[tokio::test]
    async fn pending_encounters_cannot_be_finalized() {
        let repos = Repositories::in_memory();
        let executor = EncounterExecutor::new(repos.clone());
        let card = Card::base("c", CardStats::new(1, 1, Element::Air));
        let run = executor
            .begin(
                EncounterParties {
                    owner: PlayerId(3),
                    game: GameId(1),
                    challenge: ChallengeId(1),
                },
                vec![card.clone()],
                vec![card],
            )
            .await
            .unwrap();

        let result = ledger(&repos).finalize(run.encounter().id).await;
        assert!(matches!(result, Err(RuntimeError::NotConcluded(_))));
    }
}
