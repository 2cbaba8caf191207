//! Data-driven world content and loaders.
//!
//! This crate describes the static content a battle world starts from and
//! provides loaders for RON/TOML data files:
//! - world cards, leaders, challenges and starting games (RON)
//! - the achievement catalog (TOML)
//!
//! Content is resolved into `battle-core` types before the runtime sees it.
//! Cards and leaders are referenced by name inside the files and resolved to
//! concrete stats once, at load time.

pub mod world;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use world::{CardSpec, ChallengeSpec, GameSeed, GameSpec, LeaderSpec, World, WorldSpec};

#[cfg(feature = "loaders")]
pub use loaders::{AchievementLoader, LoadResult, WorldLoader};
