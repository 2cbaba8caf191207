//! Progression rules: win/loss counters, streaks, scores and achievements.
//!
//! Everything here is pure. [`apply_outcome`] takes the current records and
//! returns the records to write; the runtime ledger decides when (and whether)
//! they are committed.

mod achievement;
mod record;

pub use achievement::{
    AchievementCatalog, AchievementCategory, AchievementDefinition, AchievementProgress, Unlock,
};
pub use record::{Outcome, ProgressionRecord, ProgressionUpdate, apply_outcome};
