//! Real-time battle sessions.
//!
//! - [`protocol`] defines the JSON messages on the wire
//! - [`pacing`] holds the configurable pauses between events
//! - [`orchestrator`] drives one connection through a battle

pub mod orchestrator;
pub mod pacing;
pub mod protocol;

pub use orchestrator::{BattleSession, CloseReason, SessionContext, SessionPhase, SessionReport};
pub use pacing::PacingConfig;
pub use protocol::{CardView, ClientMessage, ElementPair, ServerMessage};
