//! Caller identity.
//!
//! Authentication happens in front of this service; the authenticated player
//! id arrives in the `x-player-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use battle_core::PlayerId;

use crate::error::ApiError;

pub const PLAYER_HEADER: &str = "x-player-id";

/// The player making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub PlayerId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PLAYER_HEADER)
            .ok_or_else(|| ApiError::unauthenticated(format!("missing {PLAYER_HEADER} header")))?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(|id| Caller(PlayerId(id)))
            .ok_or_else(|| ApiError::unauthenticated(format!("malformed {PLAYER_HEADER} header")))
    }
}
