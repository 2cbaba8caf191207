mod common;

use std::sync::Arc;
use std::time::Duration;

use battle_core::{Side, Verdict};
use battle_runtime::{
    ClientMessage, CloseReason, ErrorKind, FinalizeOutcome, PacingConfig, Providers,
    ServerMessage, SessionPhase,
};
use tokio::time::Instant;

use common::*;

/// A one-round battle from connection to `battle-end` with no pacing.
#[tokio::test]
async fn test_full_battle_emits_events_in_order() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, SCOUT));

    handle
        .inbound
        .send(ClientMessage::Start)
        .await
        .expect("session accepts start");
    let events = collect_until_end(&mut handle).await;

    assert_eq!(
        kinds(&events),
        [
            "connection-ack",
            "battle-start",
            "round-start",
            "card-reveal",
            "card-reveal",
            "battle-animation",
            "round-result",
            "battle-end",
        ]
    );
    assert_eq!(
        events[1],
        ServerMessage::BattleStart {
            total_rounds: 1,
            challenge: "Orc Scout".into(),
        }
    );
    assert_eq!(
        events[6],
        ServerMessage::RoundResult {
            round: 1,
            winner_side: Side::Player,
            reason: "elemental advantage: fire > earth".into(),
            running_player_wins: 1,
        }
    );
    let ServerMessage::BattleEnd {
        winner_side,
        player_wins,
        total_rounds,
        reward,
        ..
    } = &events[7]
    else {
        panic!("last event should be battle-end");
    };
    assert_eq!(*winner_side, Side::Player);
    assert_eq!((*player_wins, *total_rounds), (1, 1));
    assert_eq!(reward.as_deref(), Some("+1 power"));

    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Completed);
    assert_eq!(
        report.phases,
        [
            SessionPhase::Connected,
            SessionPhase::AwaitingStart,
            SessionPhase::InRound(1),
            SessionPhase::Finalizing,
            SessionPhase::Closed,
        ]
    );
    let encounter = report.encounter.expect("encounter recorded");
    assert_eq!(encounter.verdict, Verdict::PlayerWin);
    assert!(matches!(report.finalize, Some(FinalizeOutcome::Applied(_))));

    let profile = runtime.service().profile(OWNER).await.expect("profile");
    assert_eq!(profile.progression.wins, 1);
    assert_eq!(profile.progression.score, 10);
}

#[tokio::test]
async fn test_lost_battle_has_no_reward() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, TROLL));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    let events = collect_until_end(&mut handle).await;

    assert!(matches!(
        events.last(),
        Some(ServerMessage::BattleEnd {
            winner_side: Side::Enemy,
            player_wins: 0,
            reward: None,
            ..
        })
    ));

    handle.task.await.expect("session task joins");
    let profile = runtime.service().profile(OWNER).await.expect("profile");
    assert_eq!(profile.progression.losses, 1);
    assert_eq!(profile.progression.current_streak, 0);
}

/// A rejected start leaves the session waiting and creates nothing.
#[tokio::test]
async fn test_length_mismatch_keeps_session_waiting() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, MORIA));

    assert_eq!(
        handle.outbound.recv().await,
        Some(ServerMessage::ConnectionAck)
    );
    handle.inbound.send(ClientMessage::Start).await.expect("start");
    let Some(ServerMessage::Error { message }) = handle.outbound.recv().await else {
        panic!("expected an error event");
    };
    assert!(message.contains("lineup lengths differ"), "{message}");

    // Still accepting requests after the rejection.
    handle.inbound.send(ClientMessage::Start).await.expect("retry");
    assert!(matches!(
        handle.outbound.recv().await,
        Some(ServerMessage::Error { .. })
    ));

    drop(handle.inbound);
    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Disconnected);
    assert!(report.encounter.is_none());
    assert_eq!(
        report.phases,
        [
            SessionPhase::Connected,
            SessionPhase::AwaitingStart,
            SessionPhase::Closed
        ]
    );

    let stored = runtime
        .service()
        .encounters(OWNER, SOLO_GAME)
        .await
        .expect("history");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_missing_deck_is_reported() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, EMPTY_GAME, SCOUT));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    let events = collect_until_end(&mut handle).await;

    assert_eq!(kinds(&events), ["connection-ack", "error"]);
    drop(handle.inbound);
    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Disconnected);
}

#[tokio::test]
async fn test_foreign_game_is_refused() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, FOREIGN_GAME, SCOUT));

    assert_eq!(
        handle.outbound.recv().await,
        Some(ServerMessage::error("not authorized"))
    );
    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Failed(ErrorKind::Authorization));
    assert!(!report.phases.contains(&SessionPhase::AwaitingStart));
}

#[tokio::test]
async fn test_unknown_challenge_closes_session() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::immediate());
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, UNKNOWN_CHALLENGE));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    let events = collect_until_end(&mut handle).await;
    assert_eq!(kinds(&events), ["connection-ack", "error"]);

    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Failed(ErrorKind::NotFound));
}

/// Total battle time is the sum of the configured pauses.
#[tokio::test(start_paused = true)]
async fn test_pacing_delays_are_observed() {
    let world = world();
    let pacing = PacingConfig::default();
    let runtime = runtime(&world, pacing);
    let mut handle = runtime.spawn_session(ctx(OWNER, PARTY_GAME, MORIA));

    let started = Instant::now();
    handle.inbound.send(ClientMessage::Start).await.expect("start");
    let events = collect_until_end(&mut handle).await;
    let elapsed = started.elapsed();

    assert_eq!(events.len(), 2 + 4 * 5 + 1);
    let expected = pacing.battle_start_delay + pacing.per_round() * 4;
    assert!(elapsed >= expected, "{elapsed:?} < {expected:?}");
    assert!(elapsed < expected + Duration::from_secs(1), "{elapsed:?}");

    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Completed);
}

/// Disconnecting mid-battle keeps every round already reported.
#[tokio::test(start_paused = true)]
async fn test_disconnect_mid_battle_keeps_rounds() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::default());
    let mut handle = runtime.spawn_session(ctx(OWNER, PARTY_GAME, MORIA));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    loop {
        match handle.outbound.recv().await {
            Some(ServerMessage::RoundResult { round: 1, .. }) => break,
            Some(_) => continue,
            None => panic!("session closed early"),
        }
    }
    drop(handle.inbound);

    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Disconnected);
    assert_eq!(report.phases.last(), Some(&SessionPhase::Closed));
    assert!(!report.phases.contains(&SessionPhase::Finalizing));

    let encounter = report.encounter.expect("encounter created");
    let stored = runtime
        .service()
        .encounter_report(OWNER, PARTY_GAME, encounter.id)
        .await
        .expect("report");
    assert_eq!(stored.rounds.len(), 1);
    assert_eq!(stored.encounter.verdict, Verdict::Pending);
    assert!(!stored.finalized_now);
}

/// Leaving during the pause after the last result still leaves a concluded
/// encounter, which the next read finalizes.
#[tokio::test(start_paused = true)]
async fn test_disconnect_after_final_result_keeps_verdict() {
    let world = world();
    let runtime = runtime(&world, PacingConfig::default());
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, SCOUT));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    loop {
        match handle.outbound.recv().await {
            Some(ServerMessage::RoundResult { round: 1, .. }) => break,
            Some(_) => continue,
            None => panic!("session closed early"),
        }
    }
    drop(handle.inbound);

    let report = handle.task.await.expect("session task joins");
    assert_eq!(report.close, CloseReason::Disconnected);
    assert!(report.finalize.is_none());
    let encounter = report.encounter.expect("encounter created");
    assert_eq!(encounter.verdict, Verdict::PlayerWin);
    assert!(!encounter.finalized);

    let service = runtime.service();
    let stored = service
        .encounter_report(OWNER, SOLO_GAME, encounter.id)
        .await
        .expect("report");
    assert!(stored.finalized_now);
    assert_eq!(stored.encounter.verdict, Verdict::PlayerWin);
    assert_eq!(stored.encounter.player_wins, 1);

    let profile = service.profile(OWNER).await.expect("profile");
    assert_eq!(profile.progression.wins, 1);
}

/// Heartbeats are served during pacing pauses without stalling the battle.
#[tokio::test(start_paused = true)]
async fn test_heartbeat_during_battle_records_activity() {
    let world = world();
    let activity = Arc::new(CountingActivity::default());
    let mut providers = Providers::from_world(world.clone());
    providers.activity = activity.clone();
    let runtime = battle_runtime::BattleRuntime::builder()
        .providers(providers)
        .build()
        .expect("runtime should build");
    let mut handle = runtime.spawn_session(ctx(OWNER, SOLO_GAME, SCOUT));

    handle.inbound.send(ClientMessage::Start).await.expect("start");
    loop {
        if let Some(ServerMessage::BattleStart { .. }) = handle.outbound.recv().await {
            break;
        }
    }
    handle
        .inbound
        .send(ClientMessage::Heartbeat)
        .await
        .expect("heartbeat");
    handle
        .inbound
        .send(ClientMessage::Start)
        .await
        .expect("second start");

    let events = collect_until_rest(&mut handle).await;
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, ServerMessage::BattleEnd { .. }))
            .count(),
        1
    );
    assert!(events.contains(&ServerMessage::error(
        "a battle is already running on this connection"
    )));

    handle.task.await.expect("session task joins");
    // One heartbeat plus the record taken after finalizing.
    assert_eq!(activity.calls(), 2);
}

/// Drain every event until the session closes its side.
async fn collect_until_rest(handle: &mut battle_runtime::SessionHandle) -> Vec<ServerMessage> {
    let mut events = Vec::new();
    while let Some(event) = handle.outbound.recv().await {
        events.push(event);
    }
    events
}
