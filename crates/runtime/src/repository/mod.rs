//! Repository layer for battle records.
//!
//! Repositories hold data the runtime writes while battles run:
//! - encounter headers and their guarded flags
//! - append-only round records
//! - per-player progression (also ranked for the leaderboard) and achievement
//!   progress
//!
//! Read-mostly world content (decks, challenges, collections) comes in through
//! the provider traits in [`crate::api`]. [`memory`] implements both sides for
//! tests and single-process deployments.

mod error;
pub mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::{GameRecord, MemoryStore, MemoryWorld};
pub use traits::{
    AchievementRepository, EncounterRepository, FinalizeCommit, FinalizeStore, NewEncounter,
    ProgressionRepository, Repositories, RoundRepository,
};
