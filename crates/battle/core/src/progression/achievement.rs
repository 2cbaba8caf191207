//! Achievement definitions, progress and the standard catalog.

use strum::{Display, EnumString};

use crate::ids::{AchievementId, PlayerId, Timestamp};

/// What an achievement counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AchievementCategory {
    /// Total encounters won.
    WinCount,
    /// Longest run of consecutive wins.
    Streak,
    /// Total encounters lost.
    LossCount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub name: String,
    pub category: AchievementCategory,
    pub threshold: u32,
    pub reward_points: u32,
}

impl AchievementDefinition {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        category: AchievementCategory,
        threshold: u32,
        reward_points: u32,
    ) -> Self {
        Self {
            id: AchievementId(id),
            name: name.into(),
            category,
            threshold,
            reward_points,
        }
    }
}

/// Per-player progress towards one definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AchievementProgress {
    pub player: PlayerId,
    pub achievement: AchievementId,
    pub counter: u32,
    /// Set once, the first time `counter` reaches the threshold.
    pub completed_at: Option<Timestamp>,
}

impl AchievementProgress {
    pub fn new(player: PlayerId, achievement: AchievementId) -> Self {
        Self {
            player,
            achievement,
            counter: 0,
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// An achievement completed by the current update.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unlock {
    pub achievement: AchievementId,
    pub name: String,
    pub reward_points: u32,
}

/// Immutable set of achievement definitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AchievementCatalog {
    definitions: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    pub fn new(definitions: Vec<AchievementDefinition>) -> Self {
        Self { definitions }
    }

    /// The eight achievements every world starts with.
    pub fn standard() -> Self {
        use AchievementCategory::*;

        Self::new(vec![
            AchievementDefinition::new(1, "First Victory", WinCount, 1, 10),
            AchievementDefinition::new(2, "Veteran", WinCount, 10, 50),
            AchievementDefinition::new(3, "Champion", WinCount, 50, 200),
            AchievementDefinition::new(4, "Legend", WinCount, 100, 500),
            AchievementDefinition::new(5, "On a Roll", Streak, 3, 25),
            AchievementDefinition::new(6, "Unstoppable", Streak, 5, 75),
            AchievementDefinition::new(7, "Immortal", Streak, 10, 250),
            AchievementDefinition::new(8, "Persistent", LossCount, 10, 20),
        ])
    }

    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: AchievementId) -> Option<&AchievementDefinition> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    pub fn in_category(
        &self,
        category: AchievementCategory,
    ) -> impl Iterator<Item = &AchievementDefinition> {
        self.definitions
            .iter()
            .filter(move |definition| definition.category == category)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
