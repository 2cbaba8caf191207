//! In-memory repository and provider implementations.

mod store;
mod world;

pub use store::MemoryStore;
pub use world::{GameRecord, MemoryWorld};
