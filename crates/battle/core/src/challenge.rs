//! Challenges and their victory rewards.

use std::fmt;

use strum::{Display, EnumString};

use crate::card::{Card, CardStats, StatKind};
use crate::ids::ChallengeId;

/// Size class of a challenge. The tier fixes the expected lineup length and
/// the reward granted for beating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChallengeTier {
    /// A single opponent card.
    Skirmish,
    /// Three base cards and a leader.
    SmallDungeon,
    /// Five base cards and a leader.
    LargeDungeon,
}

impl ChallengeTier {
    pub const fn expected_cards(self) -> usize {
        match self {
            Self::Skirmish => 1,
            Self::SmallDungeon => 4,
            Self::LargeDungeon => 6,
        }
    }

    pub const fn reward(self) -> Reward {
        match self {
            Self::Skirmish => Reward::new(StatKind::Power, 1),
            Self::SmallDungeon => Reward::new(StatKind::Vitality, 2),
            Self::LargeDungeon => Reward::new(StatKind::Power, 3),
        }
    }
}

/// Permanent stat increase applied to one collection card after a victory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reward {
    pub stat: StatKind,
    pub amount: u32,
}

impl Reward {
    pub const fn new(stat: StatKind, amount: u32) -> Self {
        Self { stat, amount }
    }

    #[must_use]
    pub const fn apply(&self, stats: CardStats) -> CardStats {
        stats.raised(self.stat, self.amount)
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} {}", self.amount, self.stat)
    }
}

/// Predefined opponent lineup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Challenge {
    pub id: ChallengeId,
    pub name: String,
    pub tier: ChallengeTier,
    pub cards: Vec<Card>,
}

impl Challenge {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub const fn reward(&self) -> Reward {
        self.tier.reward()
    }

    /// Whether the lineup length agrees with the tier.
    pub fn is_well_formed(&self) -> bool {
        self.cards.len() == self.tier.expected_cards()
    }
}
