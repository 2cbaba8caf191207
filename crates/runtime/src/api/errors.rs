//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from lineup validation, repositories and collaborators so
//! sessions and the service façade can bubble them up with consistent context.
//! [`RuntimeError::kind`] groups them into the categories a transport maps to
//! status codes or client-facing error events.
use std::fmt;

use battle_core::{EncounterError, EncounterId, GameId};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no deck selected for game {game}")]
    MissingLoadout { game: GameId },

    #[error(transparent)]
    Lineup(#[from] EncounterError),

    #[error("not authorized")]
    Unauthorized,

    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: u64 },

    #[error("encounter {0} has no verdict yet")]
    NotConcluded(EncounterId),

    #[error("encounter {0} did not earn a reward")]
    RewardUnavailable(EncounterId),

    #[error("reward for encounter {0} was already claimed")]
    RewardAlreadyClaimed(EncounterId),

    #[error("a battle is already running on this connection")]
    BattleInProgress,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires providers to be configured before building")]
    MissingProviders,
}

impl RuntimeError {
    pub fn not_found(kind: ResourceKind, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingLoadout { .. }
            | Self::Lineup(EncounterError::LengthMismatch { .. } | EncounterError::Empty)
            | Self::BattleInProgress => ErrorKind::Validation,
            Self::NotConcluded(_) | Self::RewardUnavailable(_) | Self::RewardAlreadyClaimed(_) => {
                ErrorKind::Conflict
            }
            Self::Unauthorized => ErrorKind::Authorization,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Repository(_) => ErrorKind::Persistence,
            Self::Lineup(_) | Self::MissingProviders => ErrorKind::Internal,
        }
    }

    /// Text safe to show to a client. Storage and internal failures are not
    /// described beyond their category.
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Persistence => "storage unavailable, battle aborted".to_string(),
            ErrorKind::Internal => "internal error, battle aborted".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input that can be fixed by the caller and retried.
    Validation,
    /// Request is well formed but conflicts with the current state.
    Conflict,
    Authorization,
    NotFound,
    /// Transient storage failure.
    Persistence,
    Internal,
}

/// Kind of entity a [`RuntimeError::NotFound`] refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Game,
    Challenge,
    Encounter,
    Card,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Game => "game",
            ResourceKind::Challenge => "challenge",
            ResourceKind::Encounter => "encounter",
            ResourceKind::Card => "card",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::ChallengeId;

    use super::*;

    #[test]
    fn lineup_validation_errors_are_retryable() {
        let mismatch = RuntimeError::from(EncounterError::LengthMismatch {
            attackers: 3,
            defenders: 4,
        });
        assert_eq!(mismatch.kind(), ErrorKind::Validation);
        assert_eq!(
            mismatch.client_message(),
            "lineup lengths differ: 3 player cards vs 4 enemy cards"
        );

        let incomplete = RuntimeError::from(EncounterError::Incomplete {
            recorded: 1,
            expected: 2,
        });
        assert_eq!(incomplete.kind(), ErrorKind::Internal);
    }

    #[test]
    fn storage_failures_hide_details() {
        let error = RuntimeError::from(RepositoryError::Unavailable("disk full".into()));
        assert_eq!(error.kind(), ErrorKind::Persistence);
        assert_eq!(error.client_message(), "storage unavailable, battle aborted");
    }

    #[test]
    fn not_found_names_the_resource() {
        let error = RuntimeError::not_found(ResourceKind::Challenge, ChallengeId(9));
        assert_eq!(error.to_string(), "challenge 9 not found");
    }
}
