//! Error types raised by repository implementations.

use battle_core::EncounterId;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("encounter {0} does not exist")]
    UnknownEncounter(EncounterId),

    #[error("round {found} of encounter {encounter} is out of order, expected {expected}")]
    RoundOutOfOrder {
        encounter: EncounterId,
        expected: u32,
        found: u32,
    },

    #[error("round {index} exceeds the {total} rounds of encounter {encounter}")]
    RoundOverflow {
        encounter: EncounterId,
        index: u32,
        total: u32,
    },

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
