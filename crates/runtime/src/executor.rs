//! Encounter executor.
//!
//! Turns two validated lineups into a persisted encounter. Each round is
//! resolved and appended to the round store before the caller sees it, so a
//! battle that is cut short keeps every round that was already reported.

use battle_core::{
    Card, ChallengeId, Encounter, GameId, Lineup, PlayerId, RoundRecord, Tally, Verdict,
};
use tracing::{debug, info};

use crate::api::{RepositoryError, Result};
use crate::repository::{NewEncounter, Repositories};
use crate::utils;

/// Who fights whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterParties {
    pub owner: PlayerId,
    pub game: GameId,
    pub challenge: ChallengeId,
}

#[derive(Clone)]
pub struct EncounterExecutor {
    repos: Repositories,
}

impl EncounterExecutor {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Validate the lineups and create the encounter record.
    ///
    /// Nothing is persisted when the lineups are rejected.
    pub async fn begin(
        &self,
        parties: EncounterParties,
        attackers: Vec<Card>,
        defenders: Vec<Card>,
    ) -> Result<EncounterRun> {
        let lineup = Lineup::new(attackers, defenders)?;

        let encounter = self
            .repos
            .encounters
            .create_encounter(NewEncounter {
                owner: parties.owner,
                game: parties.game,
                challenge: parties.challenge,
                total_rounds: lineup.len() as u32,
                started_at: utils::now(),
            })
            .await?;

        info!(
            target: "battle::executor",
            encounter = %encounter.id,
            player = %parties.owner,
            challenge = %parties.challenge,
            rounds = encounter.total_rounds,
            "Encounter started"
        );

        Ok(EncounterRun {
            encounter,
            lineup,
            tally: Tally::new(),
            repos: self.repos.clone(),
        })
    }

    /// Run every round and record the verdict in one call.
    pub async fn resolve(
        &self,
        parties: EncounterParties,
        attackers: Vec<Card>,
        defenders: Vec<Card>,
    ) -> Result<Encounter> {
        let mut run = self.begin(parties, attackers, defenders).await?;
        while run.next_round().await?.is_some() {}
        run.conclude().await
    }
}

/// An encounter in progress.
pub struct EncounterRun {
    encounter: Encounter,
    lineup: Lineup,
    tally: Tally,
    repos: Repositories,
}

impl EncounterRun {
    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn total_rounds(&self) -> u32 {
        self.encounter.total_rounds
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn is_complete(&self) -> bool {
        self.tally.rounds() == self.encounter.total_rounds
    }

    /// Resolve and persist the next round. Returns `None` once every round
    /// has been played.
    ///
    /// The tally only advances after the round is stored, so a failed append
    /// can be retried.
    pub async fn next_round(&mut self) -> Result<Option<RoundRecord>> {
        let index = self.tally.rounds() + 1;
        let Some(round) = self.lineup.resolve_round(self.encounter.id, index) else {
            return Ok(None);
        };

        self.repos.rounds.append_round(&round).await?;
        self.tally.record(&round);

        debug!(
            target: "battle::executor",
            encounter = %self.encounter.id,
            round = index,
            winner = %round.winner,
            reason = %round.reason,
            "Round recorded"
        );
        Ok(Some(round))
    }

    /// Decide and persist the verdict. Requires every round to be recorded.
    pub async fn conclude(mut self) -> Result<Encounter> {
        let verdict = self.encounter.conclude(&self.tally)?;

        let written = self
            .repos
            .encounters
            .conclude_encounter(self.encounter.id, verdict, self.encounter.player_wins)
            .await?;
        if !written {
            // Someone else decided this encounter; report what is stored.
            return self.reload().await;
        }

        info!(
            target: "battle::executor",
            encounter = %self.encounter.id,
            player_wins = self.encounter.player_wins,
            rounds = self.encounter.total_rounds,
            won = verdict == Verdict::PlayerWin,
            "Encounter concluded"
        );
        Ok(self.encounter)
    }

    async fn reload(&self) -> Result<Encounter> {
        Ok(self
            .repos
            .encounters
            .encounter(self.encounter.id)
            .await?
            .ok_or(RepositoryError::UnknownEncounter(self.encounter.id))?)
    }
}
