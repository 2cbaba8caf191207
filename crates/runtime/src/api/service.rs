//! Request/response operations outside a live session.
//!
//! [`BattleService`] is a cloneable façade for the HTTP side of a deployment:
//! reading finished encounters (which doubles as the catch-up finalize path),
//! claiming victory rewards, and reading a player's profile and the
//! leaderboard.
use std::sync::Arc;

use battle_core::{
    AchievementDefinition, CardId, CollectionCard, Encounter, EncounterId, GameId, PlayerId,
    ProgressionRecord, Reward, RoundRecord, Tally, Timestamp, Verdict,
};
use serde::Serialize;
use tracing::{info, warn};

use super::errors::{ResourceKind, Result, RuntimeError};
use super::providers::Providers;
use crate::ledger::ProgressionLedger;
use crate::repository::Repositories;

/// A stored round with its reason rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    #[serde(flatten)]
    pub round: RoundRecord,
    /// Same text as the `round-result` event.
    pub reason_text: String,
}

impl From<RoundRecord> for RoundReport {
    fn from(round: RoundRecord) -> Self {
        Self {
            reason_text: round.reason_text(),
            round,
        }
    }
}

/// A stored encounter with its rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterReport {
    pub encounter: Encounter,
    pub rounds: Vec<RoundReport>,
    /// Whether this read applied a finalize the session never completed.
    pub finalized_now: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaim {
    pub encounter: EncounterId,
    pub reward: Reward,
    pub card: CollectionCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub definition: AchievementDefinition,
    pub counter: u32,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub progression: ProgressionRecord,
    /// Every catalog entry, including ones with no progress yet.
    pub achievements: Vec<AchievementStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub progression: ProgressionRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub own_rank: Option<u32>,
}

#[derive(Clone)]
pub struct BattleService {
    repos: Repositories,
    providers: Providers,
    ledger: Arc<ProgressionLedger>,
}

impl BattleService {
    pub(crate) fn new(
        repos: Repositories,
        providers: Providers,
        ledger: Arc<ProgressionLedger>,
    ) -> Self {
        Self {
            repos,
            providers,
            ledger,
        }
    }

    /// Fails with [`RuntimeError::Unauthorized`] unless `player` owns `game`.
    pub async fn authorize(&self, player: PlayerId, game: GameId) -> Result<()> {
        if self.providers.authorizer.authorize(player, game).await? {
            Ok(())
        } else {
            Err(RuntimeError::Unauthorized)
        }
    }

    /// Encounters played in a game, oldest first.
    pub async fn encounters(&self, player: PlayerId, game: GameId) -> Result<Vec<Encounter>> {
        self.authorize(player, game).await?;
        Ok(self.repos.encounters.encounters_for_game(game).await?)
    }

    /// Read an encounter and its rounds, finalizing it first if the session
    /// that played it never applied progression.
    ///
    /// An encounter whose rounds are all stored but whose verdict was never
    /// written is concluded from those rounds first.
    pub async fn encounter_report(
        &self,
        player: PlayerId,
        game: GameId,
        id: EncounterId,
    ) -> Result<EncounterReport> {
        let mut encounter = self.owned_encounter(player, game, id).await?;
        let rounds = self.repos.rounds.rounds(id).await?;

        if encounter.verdict == Verdict::Pending && rounds.len() == encounter.total_rounds as usize
        {
            self.conclude_from_rounds(&encounter, &rounds).await?;
            encounter = self.owned_encounter(player, game, id).await?;
        }

        let mut finalized_now = false;
        if encounter.awaits_finalize() {
            finalized_now = self.ledger.finalize(id).await?.is_applied();
            if finalized_now {
                info!(target: "battle::service", encounter = %id, "Catch-up finalize applied");
            }
            encounter = self.owned_encounter(player, game, id).await?;
        }

        Ok(EncounterReport {
            encounter,
            rounds: rounds.into_iter().map(RoundReport::from).collect(),
            finalized_now,
        })
    }

    async fn conclude_from_rounds(
        &self,
        encounter: &Encounter,
        rounds: &[RoundRecord],
    ) -> Result<()> {
        let mut tally = Tally::new();
        for round in rounds {
            tally.record(round);
        }
        let mut concluded = encounter.clone();
        let verdict = concluded.conclude(&tally)?;

        let written = self
            .repos
            .encounters
            .conclude_encounter(encounter.id, verdict, concluded.player_wins)
            .await?;
        if written {
            info!(
                target: "battle::service",
                encounter = %encounter.id,
                ?verdict,
                "Catch-up conclude applied"
            );
        }
        Ok(())
    }

    /// Apply a won encounter's reward to one collection card, once.
    pub async fn claim_reward(
        &self,
        player: PlayerId,
        game: GameId,
        id: EncounterId,
        card: CardId,
    ) -> Result<RewardClaim> {
        let encounter = self.owned_encounter(player, game, id).await?;
        match encounter.verdict {
            Verdict::PlayerWin => {}
            Verdict::PlayerLoss => return Err(RuntimeError::RewardUnavailable(id)),
            Verdict::Pending => return Err(RuntimeError::NotConcluded(id)),
        }
        if encounter.reward_claimed {
            return Err(RuntimeError::RewardAlreadyClaimed(id));
        }

        let challenge = self
            .providers
            .challenges
            .challenge(encounter.challenge)
            .await?
            .ok_or_else(|| RuntimeError::not_found(ResourceKind::Challenge, encounter.challenge))?;
        let mut target = self
            .providers
            .collection
            .collection_card(game, card)
            .await?
            .ok_or_else(|| RuntimeError::not_found(ResourceKind::Card, card))?;

        if !self.repos.encounters.mark_reward_claimed(id).await? {
            return Err(RuntimeError::RewardAlreadyClaimed(id));
        }

        let reward = challenge.reward();
        target.stats = reward.apply(target.stats);
        if let Err(err) = self
            .providers
            .collection
            .save_collection_card(game, &target)
            .await
        {
            warn!(
                target: "battle::service",
                encounter = %id,
                card = %card,
                error = %err,
                "Reward card write failed, releasing claim"
            );
            self.repos.encounters.release_reward_claim(id).await?;
            return Err(err);
        }

        info!(
            target: "battle::service",
            encounter = %id,
            card = %card,
            %reward,
            "Reward claimed"
        );
        Ok(RewardClaim {
            encounter: id,
            reward,
            card: target,
        })
    }

    pub async fn profile(&self, player: PlayerId) -> Result<PlayerProfile> {
        let progression = self
            .repos
            .progression
            .progression(player)
            .await?
            .unwrap_or_else(|| ProgressionRecord::new(player));
        let rows = self.repos.achievements.achievement_progress(player).await?;

        let achievements = self
            .ledger
            .catalog()
            .definitions()
            .iter()
            .map(|definition| {
                let row = rows.iter().find(|row| row.achievement == definition.id);
                AchievementStatus {
                    definition: definition.clone(),
                    counter: row.map_or(0, |row| row.counter),
                    completed_at: row.and_then(|row| row.completed_at),
                }
            })
            .collect();

        Ok(PlayerProfile {
            progression,
            achievements,
        })
    }

    /// The `limit` best players by score, then wins, and the caller's own
    /// rank if they have finished any encounter.
    pub async fn leaderboard(&self, player: PlayerId, limit: usize) -> Result<Leaderboard> {
        let entries = self
            .repos
            .progression
            .top(limit)
            .await?
            .into_iter()
            .zip(1..)
            .map(|(progression, rank)| LeaderboardEntry { rank, progression })
            .collect();
        let own_rank = self.repos.progression.rank(player).await?;

        Ok(Leaderboard { entries, own_rank })
    }

    /// Load an encounter the caller may see. Encounters of other players or
    /// other games read as missing.
    async fn owned_encounter(
        &self,
        player: PlayerId,
        game: GameId,
        id: EncounterId,
    ) -> Result<Encounter> {
        self.authorize(player, game).await?;
        self.repos
            .encounters
            .encounter(id)
            .await?
            .filter(|encounter| encounter.game == game && encounter.owner == player)
            .ok_or_else(|| RuntimeError::not_found(ResourceKind::Encounter, id))
    }
}
