//! Content loaders for reading world data from files.
//!
//! Loaders convert RON/TOML files into resolved `battle-core` values. Every
//! reference inside a file is checked at load time, so a world that loads is
//! consistent.

pub mod achievements;
pub mod world;

pub use achievements::AchievementLoader;
pub use world::WorldLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
