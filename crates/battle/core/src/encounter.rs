//! Encounters: index-paired lineups, round records and verdicts.
//!
//! An [`Encounter`] is one full battle between the player's ordered cards and a
//! challenge's ordered cards. A [`Lineup`] validates the pairing up front so no
//! round can ever be produced for sequences of different length. Rounds are
//! resolved one at a time and tallied; the [`Verdict`] is decided only once all
//! of them have been recorded.

use thiserror::Error;

use crate::card::{Card, CardSnapshot};
use crate::combat::{ClashReason, Side, resolve_clash};
use crate::ids::{ChallengeId, EncounterId, GameId, PlayerId, Timestamp};
use crate::progression::Outcome;

/// Number of round wins the player needs out of `total_rounds`: `ceil(N / 2)`.
///
/// Round-level ties already go to the defender inside the resolver, so an even
/// split still counts as a player win here.
pub const fn required_wins(total_rounds: usize) -> usize {
    total_rounds.div_ceil(2)
}

/// Errors raised while building or concluding an encounter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error("lineup lengths differ: {attackers} player cards vs {defenders} enemy cards")]
    LengthMismatch { attackers: usize, defenders: usize },

    #[error("lineup has no cards")]
    Empty,

    #[error("encounter has {recorded} of {expected} rounds recorded")]
    Incomplete { recorded: u32, expected: u32 },

    #[error("encounter verdict was already decided")]
    AlreadyConcluded,
}

/// Aggregate result of an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Verdict {
    #[default]
    Pending,
    PlayerWin,
    PlayerLoss,
}

impl Verdict {
    /// Decide the verdict from the player's round wins.
    pub const fn decide(player_wins: usize, total_rounds: usize) -> Self {
        if player_wins >= required_wins(total_rounds) {
            Self::PlayerWin
        } else {
            Self::PlayerLoss
        }
    }

    pub const fn is_concluded(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Pending => None,
            Self::PlayerWin => Some(Side::Player),
            Self::PlayerLoss => Some(Side::Enemy),
        }
    }

    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Pending => None,
            Self::PlayerWin => Some(Outcome::Win),
            Self::PlayerLoss => Some(Outcome::Loss),
        }
    }
}

/// One resolved clash. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRecord {
    pub encounter: EncounterId,
    /// 1-based position in the encounter.
    pub index: u32,
    pub attacker: CardSnapshot,
    pub defender: CardSnapshot,
    pub winner: Side,
    pub reason: ClashReason,
}

impl RoundRecord {
    #[inline]
    pub fn player_won(&self) -> bool {
        self.winner == Side::Player
    }

    /// Human-readable reason, e.g. `"defender wins ties"`.
    pub fn reason_text(&self) -> String {
        self.reason.to_string()
    }
}

/// Two equally long, non-empty card sequences paired by index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lineup {
    attackers: Vec<Card>,
    defenders: Vec<Card>,
}

impl Lineup {
    pub fn new(attackers: Vec<Card>, defenders: Vec<Card>) -> Result<Self, EncounterError> {
        if attackers.len() != defenders.len() {
            return Err(EncounterError::LengthMismatch {
                attackers: attackers.len(),
                defenders: defenders.len(),
            });
        }
        if attackers.is_empty() {
            return Err(EncounterError::Empty);
        }
        Ok(Self {
            attackers,
            defenders,
        })
    }

    pub fn len(&self) -> usize {
        self.attackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attackers.is_empty()
    }

    pub fn attackers(&self) -> &[Card] {
        &self.attackers
    }

    pub fn defenders(&self) -> &[Card] {
        &self.defenders
    }

    /// The pair played in round `index` (1-based).
    pub fn pair(&self, index: u32) -> Option<(&Card, &Card)> {
        let slot = (index as usize).checked_sub(1)?;
        Some((self.attackers.get(slot)?, self.defenders.get(slot)?))
    }

    /// Resolve round `index` (1-based). Returns `None` past the last round.
    pub fn resolve_round(&self, encounter: EncounterId, index: u32) -> Option<RoundRecord> {
        let (attacker, defender) = self.pair(index)?;
        let outcome = resolve_clash(&attacker.stats(), &defender.stats());

        Some(RoundRecord {
            encounter,
            index,
            attacker: attacker.snapshot(),
            defender: defender.snapshot(),
            winner: outcome.winner,
            reason: outcome.reason,
        })
    }

    /// All rounds in order `1..=N`.
    pub fn rounds(&self, encounter: EncounterId) -> impl Iterator<Item = RoundRecord> + '_ {
        (1..=self.len() as u32).filter_map(move |index| self.resolve_round(encounter, index))
    }
}

/// Running count of recorded rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    rounds: u32,
    player_wins: u32,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, round: &RoundRecord) {
        self.rounds += 1;
        if round.player_won() {
            self.player_wins += 1;
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn player_wins(&self) -> u32 {
        self.player_wins
    }
}

/// Persistent header of one battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub id: EncounterId,
    pub owner: PlayerId,
    pub game: GameId,
    pub challenge: ChallengeId,
    pub total_rounds: u32,
    pub player_wins: u32,
    pub verdict: Verdict,
    /// One-way flag: progression has been applied for this encounter.
    pub finalized: bool,
    /// Set once the victory reward has been applied to a card. Cleared only
    /// when the card write of that claim fails.
    pub reward_claimed: bool,
    pub started_at: Timestamp,
}

impl Encounter {
    pub fn new(
        id: EncounterId,
        owner: PlayerId,
        game: GameId,
        challenge: ChallengeId,
        total_rounds: u32,
        started_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            game,
            challenge,
            total_rounds,
            player_wins: 0,
            verdict: Verdict::Pending,
            finalized: false,
            reward_claimed: false,
            started_at,
        }
    }

    /// Decide the verdict from a tally covering every round.
    pub fn conclude(&mut self, tally: &Tally) -> Result<Verdict, EncounterError> {
        if self.verdict.is_concluded() {
            return Err(EncounterError::AlreadyConcluded);
        }
        if tally.rounds() != self.total_rounds {
            return Err(EncounterError::Incomplete {
                recorded: tally.rounds(),
                expected: self.total_rounds,
            });
        }

        self.player_wins = tally.player_wins();
        self.verdict = Verdict::decide(tally.player_wins() as usize, self.total_rounds as usize);
        Ok(self.verdict)
    }

    /// Concluded but progression not yet applied.
    pub fn awaits_finalize(&self) -> bool {
        self.verdict.is_concluded() && !self.finalized
    }
}
