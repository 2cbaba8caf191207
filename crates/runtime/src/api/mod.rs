//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on sessions, execution and storage.

pub mod errors;
pub mod providers;
pub mod service;

pub use errors::{ErrorKind, RepositoryError, ResourceKind, Result, RuntimeError};
pub use providers::{
    ActivityRecorder, ChallengeProvider, CollectionRepository, LoadoutProvider, Providers,
    SessionAuthorizer,
};
pub use service::{
    AchievementStatus, BattleService, EncounterReport, Leaderboard, LeaderboardEntry,
    PlayerProfile, RewardClaim, RoundReport,
};
