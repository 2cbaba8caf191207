//! Single-clash combat resolution.
//!
//! One clash pits the player's card (the attacker) against the enemy's card
//! (the defender). Resolution is a fixed cascade with no randomness.

mod resolver;
mod result;

pub use resolver::resolve_clash;
pub use result::{ClashOutcome, ClashReason, Side};
