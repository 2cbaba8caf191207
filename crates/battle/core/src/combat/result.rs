//! Clash outcome types.

use std::fmt;

use crate::card::Element;

/// Side of a battle. The player always attacks, the enemy always defends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule of the cascade that decided a clash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "kebab-case"))]
pub enum ClashReason {
    /// Only the winner's power exceeded the loser's vitality.
    Lethal {
        winner: Side,
        power: u32,
        vitality: u32,
    },
    /// Neither or both sides were lethal and the winner's element prevails.
    ElementalAdvantage {
        winner: Side,
        stronger: Element,
        weaker: Element,
    },
    /// No lethal edge and no elemental advantage.
    DefenderWinsTies,
}

impl fmt::Display for ClashReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Lethal {
                winner,
                power,
                vitality,
            } => write!(
                f,
                "{winner} power {power} > {} vitality {vitality}",
                winner.opponent()
            ),
            Self::ElementalAdvantage {
                stronger, weaker, ..
            } => write!(f, "elemental advantage: {stronger} > {weaker}"),
            Self::DefenderWinsTies => f.write_str("defender wins ties"),
        }
    }
}

/// Result of one clash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClashOutcome {
    pub winner: Side,
    pub reason: ClashReason,
}

impl ClashOutcome {
    #[inline]
    pub const fn attacker_wins(&self) -> bool {
        matches!(self.winner, Side::Player)
    }
}
