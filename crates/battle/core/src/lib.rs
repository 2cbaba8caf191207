//! Deterministic battle rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical rules of a card battle and exposes pure
//! APIs only: no I/O, no clocks, no randomness. Identical inputs always yield
//! identical outputs, which is what lets the runtime persist, replay and
//! finalize encounters safely.
//!
//! Modules are organized leaf to root:
//! - [`card`] card stats, elements and the leader variant projection
//! - [`combat`] the single-clash resolver and its outcome types
//! - [`encounter`] index-paired lineups, round records and verdicts
//! - [`progression`] streaks, scores and achievement progress rules
//! - [`challenge`] challenge tiers and their rewards
pub mod card;
pub mod challenge;
pub mod combat;
pub mod encounter;
pub mod ids;
pub mod progression;

pub use card::{Card, CardKind, CardSnapshot, CardStats, CollectionCard, Element, StatKind};
pub use challenge::{Challenge, ChallengeTier, Reward};
pub use combat::{ClashOutcome, ClashReason, Side, resolve_clash};
pub use encounter::{
    Encounter, EncounterError, Lineup, RoundRecord, Tally, Verdict, required_wins,
};
pub use ids::{AchievementId, CardId, ChallengeId, EncounterId, GameId, PlayerId, Timestamp};
pub use progression::{
    AchievementCatalog, AchievementCategory, AchievementDefinition, AchievementProgress,
    Outcome, ProgressionRecord, ProgressionUpdate, Unlock, apply_outcome,
};
