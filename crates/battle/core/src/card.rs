//! Card stats, elements and the leader variant.
//!
//! A battle only ever sees [`CardStats`]: the effective power, vitality and
//! element of a card at the moment it is played. Leader cards are stored as
//! their base stats plus the stat they double, and [`CardKind::effective`]
//! projects them to plain stats.

use strum::{Display, EnumIter, EnumString};

use crate::ids::CardId;

/// Element of a card.
///
/// The advantage cycle is Fire > Earth > Water > Air > Fire. The opposite
/// pairs (Fire/Water, Earth/Air) have no winner and count as a tie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Element {
    Fire,
    Earth,
    Water,
    Air,
}

impl Element {
    pub const ALL: [Element; 4] = [Self::Fire, Self::Earth, Self::Water, Self::Air];

    /// Returns true if `self` has the elemental advantage over `other`.
    pub const fn beats(self, other: Element) -> bool {
        matches!(
            (self, other),
            (Self::Fire, Self::Earth)
                | (Self::Earth, Self::Water)
                | (Self::Water, Self::Air)
                | (Self::Air, Self::Fire)
        )
    }
}

/// Which numeric stat a leader doubles or a reward raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StatKind {
    Power,
    Vitality,
}

/// Effective stats of a card as seen by the combat resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardStats {
    pub power: u32,
    pub vitality: u32,
    pub element: Element,
}

impl CardStats {
    pub const fn new(power: u32, vitality: u32, element: Element) -> Self {
        Self {
            power,
            vitality,
            element,
        }
    }

    pub const fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Power => self.power,
            StatKind::Vitality => self.vitality,
        }
    }

    /// Returns a copy with `stat` raised by `amount` (saturating).
    #[must_use]
    pub const fn raised(mut self, stat: StatKind, amount: u32) -> Self {
        match stat {
            StatKind::Power => self.power = self.power.saturating_add(amount),
            StatKind::Vitality => self.vitality = self.vitality.saturating_add(amount),
        }
        self
    }
}

/// A card is either a base card or a leader built on top of a base card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardKind {
    Base(CardStats),
    Leader { base: CardStats, doubled: StatKind },
}

impl CardKind {
    /// Projects the variant to the stats used in combat.
    pub const fn effective(&self) -> CardStats {
        match *self {
            Self::Base(stats) => stats,
            Self::Leader { base, doubled } => {
                let bonus = base.get(doubled);
                base.raised(doubled, bonus)
            }
        }
    }

    pub const fn is_leader(&self) -> bool {
        matches!(self, Self::Leader { .. })
    }
}

/// Named card as it appears in a lineup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
}

impl Card {
    pub fn base(name: impl Into<String>, stats: CardStats) -> Self {
        Self {
            name: name.into(),
            kind: CardKind::Base(stats),
        }
    }

    pub fn leader(name: impl Into<String>, base: CardStats, doubled: StatKind) -> Self {
        Self {
            name: name.into(),
            kind: CardKind::Leader { base, doubled },
        }
    }

    pub const fn stats(&self) -> CardStats {
        self.kind.effective()
    }

    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            name: self.name.clone(),
            stats: self.stats(),
            leader: self.kind.is_leader(),
        }
    }
}

/// Frozen copy of a card taken when a round is resolved.
///
/// Later changes to the card (rewards, edits) never alter a recorded round.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardSnapshot {
    pub name: String,
    pub stats: CardStats,
    pub leader: bool,
}

/// A card owned by a player. Its stats grow as rewards are applied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionCard {
    pub id: CardId,
    pub name: String,
    pub stats: CardStats,
}

impl CollectionCard {
    pub fn new(id: CardId, name: impl Into<String>, stats: CardStats) -> Self {
        Self {
            id,
            name: name.into(),
            stats,
        }
    }

    pub fn to_card(&self) -> Card {
        Card::base(self.name.clone(), self.stats)
    }
}
