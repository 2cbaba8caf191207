//! Runtime orchestration for card battles.
//!
//! This crate wires the pure rules of `battle-core` to storage, collaborators
//! and live connections. Consumers embed [`BattleRuntime`] to open battle
//! sessions and reach the request/response operations through
//! [`BattleService`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the shared runtime, its builder and configuration
//! - [`api`] exposes errors, collaborator traits and the service façade
//! - [`session`] drives one connection through a paced battle
//! - [`executor`] resolves and persists encounters round by round
//! - [`ledger`] applies concluded encounters to progression exactly once
//! - [`repository`] defines record storage and its in-memory implementation
pub mod api;
pub mod executor;
pub mod ledger;
pub mod repository;
pub mod runtime;
pub mod session;

mod utils;

pub use api::{
    ActivityRecorder, BattleService, ChallengeProvider, CollectionRepository, EncounterReport,
    ErrorKind, Leaderboard, LeaderboardEntry, LoadoutProvider, PlayerProfile, Providers, Result,
    RewardClaim, RoundReport, RuntimeError, SessionAuthorizer,
};
pub use executor::{EncounterExecutor, EncounterParties, EncounterRun};
pub use ledger::{FinalizeOutcome, ProgressionLedger};
pub use repository::{
    FinalizeStore, GameRecord, MemoryStore, MemoryWorld, RepositoryError, Repositories,
};
pub use runtime::{BattleRuntime, BattleRuntimeBuilder, RuntimeConfig, SessionHandle};
pub use session::{
    BattleSession, ClientMessage, CloseReason, PacingConfig, ServerMessage, SessionContext,
    SessionPhase, SessionReport,
};
