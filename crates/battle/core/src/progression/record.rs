//! Per-player progression record and the outcome rules.

use std::collections::HashMap;

use crate::ids::{AchievementId, PlayerId, Timestamp};

use super::achievement::{
    AchievementCatalog, AchievementCategory, AchievementDefinition, AchievementProgress, Unlock,
};

/// Outcome of a concluded encounter from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Outcome {
    Win,
    Loss,
}

/// Cumulative stats of one player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressionRecord {
    pub player: PlayerId,
    pub wins: u32,
    pub losses: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub score: u64,
}

impl ProgressionRecord {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn encounters(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Records produced by applying one outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressionUpdate {
    pub progression: ProgressionRecord,
    /// Progress rows touched by this outcome (new or changed).
    pub progress: Vec<AchievementProgress>,
    /// Achievements completed by this outcome, in catalog order.
    pub unlocked: Vec<Unlock>,
}

impl ProgressionUpdate {
    pub fn points_awarded(&self) -> u64 {
        self.unlocked
            .iter()
            .map(|unlock| u64::from(unlock.reward_points))
            .sum()
    }
}

/// Apply one encounter outcome to a player's records.
///
/// - win: wins+1, streak+1, max streak raised, progress for `win-count` and
///   `streak` achievements
/// - loss: losses+1, streak reset, progress for `loss-count` achievements
///
/// Count achievements advance by one; streak achievements track the current
/// streak. The first time a counter reaches its threshold the completion time
/// is stamped and the reward points are added to the score. Already completed
/// achievements keep counting but never pay out again.
pub fn apply_outcome(
    record: &ProgressionRecord,
    existing: &[AchievementProgress],
    catalog: &AchievementCatalog,
    outcome: Outcome,
    now: Timestamp,
) -> ProgressionUpdate {
    let mut progression = record.clone();

    let categories: &[AchievementCategory] = match outcome {
        Outcome::Win => {
            progression.wins = progression.wins.saturating_add(1);
            progression.current_streak = progression.current_streak.saturating_add(1);
            progression.max_streak = progression.max_streak.max(progression.current_streak);
            &[AchievementCategory::WinCount, AchievementCategory::Streak]
        }
        Outcome::Loss => {
            progression.losses = progression.losses.saturating_add(1);
            progression.current_streak = 0;
            &[AchievementCategory::LossCount]
        }
    };

    let by_id: HashMap<AchievementId, &AchievementProgress> = existing
        .iter()
        .map(|progress| (progress.achievement, progress))
        .collect();

    let mut progress = Vec::new();
    let mut unlocked = Vec::new();

    for definition in catalog
        .definitions()
        .iter()
        .filter(|definition| categories.contains(&definition.category))
    {
        let mut row = by_id
            .get(&definition.id)
            .map(|row| (*row).clone())
            .unwrap_or_else(|| AchievementProgress::new(record.player, definition.id));

        if !advance(&mut row, definition, &progression) {
            continue;
        }

        if row.completed_at.is_none() && row.counter >= definition.threshold {
            row.completed_at = Some(now);
            progression.score = progression
                .score
                .saturating_add(u64::from(definition.reward_points));
            unlocked.push(Unlock {
                achievement: definition.id,
                name: definition.name.clone(),
                reward_points: definition.reward_points,
            });
        }

        progress.push(row);
    }

    ProgressionUpdate {
        progression,
        progress,
        unlocked,
    }
}

/// Grant progress to one row. Returns false if the row did not change.
fn advance(
    row: &mut AchievementProgress,
    definition: &AchievementDefinition,
    progression: &ProgressionRecord,
) -> bool {
    let next = match definition.category {
        AchievementCategory::WinCount | AchievementCategory::LossCount => {
            row.counter.saturating_add(1)
        }
        AchievementCategory::Streak => row.counter.max(progression.current_streak),
    };

    if next == row.counter {
        return false;
    }
    row.counter = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: PlayerId = PlayerId(42);

    fn catalog() -> AchievementCatalog {
        AchievementCatalog::standard()
    }

    /// Apply `outcomes` in order, carrying records forward like the ledger does.
    fn replay(outcomes: &[Outcome]) -> (ProgressionRecord, Vec<AchievementProgress>) {
        let catalog = catalog();
        let mut record = ProgressionRecord::new(PLAYER);
        let mut rows: Vec<AchievementProgress> = Vec::new();

        for (step, outcome) in outcomes.iter().enumerate() {
            let update = apply_outcome(&record, &rows, &catalog, *outcome, Timestamp(step as i64));
            record = update.progression;
            for row in update.progress {
                match rows.iter_mut().find(|r| r.achievement == row.achievement) {
                    Some(existing) => *existing = row,
                    None => rows.push(row),
                }
            }
        }
        (record, rows)
    }

    #[test]
    fn first_win_unlocks_first_victory() {
        let update = apply_outcome(
            &ProgressionRecord::new(PLAYER),
            &[],
            &catalog(),
            Outcome::Win,
            Timestamp(99),
        );

        assert_eq!(update.progression.wins, 1);
        assert_eq!(update.progression.current_streak, 1);
        assert_eq!(update.progression.max_streak, 1);
        assert_eq!(update.progression.score, 10);
        assert_eq!(update.unlocked.len(), 1);
        assert_eq!(update.unlocked[0].achievement, AchievementId(1));

        let first = update
            .progress
            .iter()
            .find(|row| row.achievement == AchievementId(1))
            .unwrap();
        assert_eq!(first.completed_at, Some(Timestamp(99)));
    }

    #[test]
    fn loss_resets_streak_but_keeps_max() {
        let (record, _) = replay(&[Outcome::Win, Outcome::Win, Outcome::Loss]);

        assert_eq!(record.wins, 2);
        assert_eq!(record.losses, 1);
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.max_streak, 2);
    }

    #[test]
    fn streak_achievement_unlocks_once() {
        let (record, rows) = replay(&[
            Outcome::Win,
            Outcome::Win,
            Outcome::Win,
            Outcome::Loss,
            Outcome::Win,
            Outcome::Win,
            Outcome::Win,
        ]);

        // first victory (10) + on a roll (25), never paid twice
        assert_eq!(record.score, 35);
        let on_a_roll = rows
            .iter()
            .find(|row| row.achievement == AchievementId(5))
            .unwrap();
        assert_eq!(on_a_roll.counter, 3);
        assert_eq!(on_a_roll.completed_at, Some(Timestamp(2)));
    }

    #[test]
    fn counters_past_threshold_do_not_pay_again() {
        let (record, rows) = replay(&[Outcome::Win, Outcome::Loss, Outcome::Win]);

        let first = rows
            .iter()
            .find(|row| row.achievement == AchievementId(1))
            .unwrap();
        assert_eq!(first.counter, 2);
        assert_eq!(first.completed_at, Some(Timestamp(0)));
        assert_eq!(record.score, 10);
    }

    #[test]
    fn losses_only_touch_loss_achievements() {
        let update = apply_outcome(
            &ProgressionRecord::new(PLAYER),
            &[],
            &catalog(),
            Outcome::Loss,
            Timestamp(1),
        );

        assert_eq!(update.progress.len(), 1);
        assert_eq!(update.progress[0].achievement, AchievementId(8));
        assert_eq!(update.progress[0].counter, 1);
        assert!(update.unlocked.is_empty());
    }
}
