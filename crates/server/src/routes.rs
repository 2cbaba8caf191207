//! HTTP and WebSocket routes.

use std::sync::Arc;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Json, Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use battle_core::{CardId, ChallengeId, Encounter, EncounterId, GameId};
use battle_runtime::{
    BattleRuntime, EncounterReport, Leaderboard, PlayerProfile, RewardClaim, SessionContext,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::socket;

const LEADERBOARD_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<BattleRuntime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub card_id: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws/battle/{game}/{challenge}", get(battle_socket))
        .route("/games/{game}/encounters", get(list_encounters))
        .route("/games/{game}/encounters/{encounter}", get(encounter_report))
        .route(
            "/games/{game}/encounters/{encounter}/reward",
            post(claim_reward),
        )
        .route("/players/me/profile", get(profile))
        .route("/leaderboard", get(leaderboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Upgrade to a battle session. Ownership is checked before the upgrade so a
/// refused caller gets a plain HTTP error.
async fn battle_socket(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path((game, challenge)): Path<(u64, u64)>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let game = GameId(game);
    state.runtime.service().authorize(player, game).await?;

    let ctx = SessionContext {
        player,
        game,
        challenge: ChallengeId(challenge),
    };
    let runtime = state.runtime.clone();
    Ok(upgrade.on_upgrade(move |ws| async move { socket::bridge(ws, &runtime, ctx).await }))
}

async fn list_encounters(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(game): Path<u64>,
) -> Result<Json<Vec<Encounter>>, ApiError> {
    let encounters = state
        .runtime
        .service()
        .encounters(player, GameId(game))
        .await?;
    Ok(Json(encounters))
}

/// Read an encounter with its rounds. Also completes a finalize the live
/// session did not get to.
async fn encounter_report(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path((game, encounter)): Path<(u64, u64)>,
) -> Result<Json<EncounterReport>, ApiError> {
    let report = state
        .runtime
        .service()
        .encounter_report(player, GameId(game), EncounterId(encounter))
        .await?;
    Ok(Json(report))
}

async fn claim_reward(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path((game, encounter)): Path<(u64, u64)>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<RewardClaim>, ApiError> {
    let claim = state
        .runtime
        .service()
        .claim_reward(
            player,
            GameId(game),
            EncounterId(encounter),
            CardId(request.card_id),
        )
        .await?;
    Ok(Json(claim))
}

async fn profile(
    State(state): State<AppState>,
    Caller(player): Caller,
) -> Result<Json<PlayerProfile>, ApiError> {
    let profile = state.runtime.service().profile(player).await?;
    Ok(Json(profile))
}

async fn leaderboard(
    State(state): State<AppState>,
    Caller(player): Caller,
) -> Result<Json<Leaderboard>, ApiError> {
    let board = state
        .runtime
        .service()
        .leaderboard(player, LEADERBOARD_SIZE)
        .await?;
    Ok(Json(board))
}
