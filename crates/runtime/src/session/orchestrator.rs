//! One battle connection driven as a state machine.
//!
//! A [`BattleSession`] owns the two channel ends of a connection. It waits for
//! a start request, plays every round through the executor with pacing pauses,
//! finalizes the encounter through the ledger and closes. The phases are
//! `Connected → AwaitingStart → InRound(1..N) → Finalizing → Closed`; any
//! phase may jump to `Closed` on disconnect or fault.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    Challenge, ChallengeId, Encounter, GameId, PlayerId, RoundRecord, Side, Verdict,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::pacing::PacingConfig;
use super::protocol::{ClientMessage, ServerMessage};
use crate::api::{ErrorKind, Providers, ResourceKind, RuntimeError};
use crate::executor::{EncounterExecutor, EncounterParties, EncounterRun};
use crate::ledger::{FinalizeOutcome, ProgressionLedger};
use crate::utils;

/// Who connected and what they want to fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub player: PlayerId,
    pub game: GameId,
    pub challenge: ChallengeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connected,
    AwaitingStart,
    InRound(u32),
    Finalizing,
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::AwaitingStart => f.write_str("awaiting-start"),
            Self::InRound(round) => write!(f, "in-round({round})"),
            Self::Finalizing => f.write_str("finalizing"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Why a session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// `battle-end` was delivered.
    Completed,
    /// The client went away.
    Disconnected,
    Failed(ErrorKind),
}

/// What a finished session leaves behind.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub close: CloseReason,
    /// Latest known header of the encounter this session created, if any.
    pub encounter: Option<Encounter>,
    pub finalize: Option<FinalizeOutcome>,
    /// Every phase entered, in order.
    pub phases: Vec<SessionPhase>,
}

enum Interrupt {
    Disconnected,
    Fault(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Self::Fault(error)
    }
}

struct Battle {
    run: EncounterRun,
    challenge: Challenge,
}

pub struct BattleSession {
    ctx: SessionContext,
    pacing: PacingConfig,
    executor: EncounterExecutor,
    ledger: Arc<ProgressionLedger>,
    providers: Providers,
    inbound: mpsc::Receiver<ClientMessage>,
    outbound: mpsc::Sender<ServerMessage>,
    phases: Vec<SessionPhase>,
    encounter: Option<Encounter>,
    finalize: Option<FinalizeOutcome>,
}

impl BattleSession {
    pub fn new(
        ctx: SessionContext,
        pacing: PacingConfig,
        executor: EncounterExecutor,
        ledger: Arc<ProgressionLedger>,
        providers: Providers,
        inbound: mpsc::Receiver<ClientMessage>,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self {
            ctx,
            pacing,
            executor,
            ledger,
            providers,
            inbound,
            outbound,
            phases: vec![SessionPhase::Connected],
            encounter: None,
            finalize: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phases
            .last()
            .copied()
            .unwrap_or(SessionPhase::Connected)
    }

    /// Drive the connection until it closes.
    pub async fn run(self) -> SessionReport {
        let span = info_span!(
            "battle_session",
            player = %self.ctx.player,
            game = %self.ctx.game,
            challenge = %self.ctx.challenge,
        );
        self.drive().instrument(span).await
    }

    async fn drive(mut self) -> SessionReport {
        let close = match self.serve().await {
            Ok(()) => CloseReason::Completed,
            Err(Interrupt::Disconnected) => CloseReason::Disconnected,
            Err(Interrupt::Fault(fault)) => {
                match fault.kind() {
                    ErrorKind::Authorization => warn!("Connection rejected"),
                    kind => error!(error = %fault, ?kind, phase = %self.phase(), "Session failed"),
                }
                // The client may already be gone; closing proceeds regardless.
                let _ = self
                    .outbound
                    .send(ServerMessage::error(fault.client_message()))
                    .await;
                CloseReason::Failed(fault.kind())
            }
        };

        self.enter(SessionPhase::Closed);
        info!(?close, "Session closed");

        SessionReport {
            close,
            encounter: self.encounter,
            finalize: self.finalize,
            phases: self.phases,
        }
    }

    async fn serve(&mut self) -> Result<(), Interrupt> {
        let authorized = self
            .providers
            .authorizer
            .authorize(self.ctx.player, self.ctx.game)
            .await?;
        if !authorized {
            return Err(RuntimeError::Unauthorized.into());
        }

        self.enter(SessionPhase::AwaitingStart);
        self.emit(ServerMessage::ConnectionAck).await?;

        let battle = self.await_start().await?;
        let encounter = self.play(battle.run, &battle.challenge).await?;
        self.finish(encounter, &battle.challenge).await
    }

    async fn await_start(&mut self) -> Result<Battle, Interrupt> {
        loop {
            match self.inbound.recv().await {
                None => return Err(Interrupt::Disconnected),
                Some(ClientMessage::Heartbeat) => self.heartbeat().await,
                Some(ClientMessage::Start) => match self.begin_battle().await {
                    Ok(battle) => return Ok(battle),
                    Err(rejected) if rejected.kind() == ErrorKind::Validation => {
                        warn!(error = %rejected, "Battle start rejected");
                        self.emit(ServerMessage::error(rejected.client_message()))
                            .await?;
                    }
                    Err(fault) => return Err(fault.into()),
                },
            }
        }
    }

    async fn begin_battle(&mut self) -> Result<Battle, RuntimeError> {
        let challenge = self
            .providers
            .challenges
            .challenge(self.ctx.challenge)
            .await?
            .ok_or_else(|| RuntimeError::not_found(ResourceKind::Challenge, self.ctx.challenge))?;
        let loadout = self
            .providers
            .loadouts
            .loadout(self.ctx.game)
            .await?
            .ok_or(RuntimeError::MissingLoadout { game: self.ctx.game })?;

        let run = self
            .executor
            .begin(
                EncounterParties {
                    owner: self.ctx.player,
                    game: self.ctx.game,
                    challenge: self.ctx.challenge,
                },
                loadout,
                challenge.cards.clone(),
            )
            .await?;
        self.encounter = Some(run.encounter().clone());

        Ok(Battle { run, challenge })
    }

    /// Play every round and return the concluded encounter.
    ///
    /// The verdict is persisted as soon as the last round is stored, before
    /// that round is shown, so a client leaving during the final pauses still
    /// leaves an encounter the catch-up path can finalize.
    async fn play(
        &mut self,
        mut run: EncounterRun,
        challenge: &Challenge,
    ) -> Result<Encounter, Interrupt> {
        self.emit(ServerMessage::BattleStart {
            total_rounds: run.total_rounds(),
            challenge: challenge.name.clone(),
        })
        .await?;
        self.pause(self.pacing.battle_start_delay).await?;

        loop {
            self.enter(SessionPhase::InRound(run.tally().rounds() + 1));
            let Some(round) = run.next_round().await? else {
                return Ok(run.conclude().await?);
            };
            let running_wins = run.tally().player_wins();

            if run.is_complete() {
                let encounter = run.conclude().await?;
                self.encounter = Some(encounter.clone());
                self.show_round(&round, running_wins).await?;
                return Ok(encounter);
            }
            self.show_round(&round, running_wins).await?;
        }
    }

    async fn show_round(
        &mut self,
        round: &RoundRecord,
        running_wins: u32,
    ) -> Result<(), Interrupt> {
        let delays = [
            self.pacing.round_start_delay,
            self.pacing.reveal_delay,
            self.pacing.reveal_delay,
            self.pacing.animation_delay,
            self.pacing.result_delay,
        ];
        for (event, delay) in ServerMessage::round_events(round, running_wins)
            .into_iter()
            .zip(delays)
        {
            self.emit(event).await?;
            self.pause(delay).await?;
        }
        Ok(())
    }

    async fn finish(
        &mut self,
        encounter: Encounter,
        challenge: &Challenge,
    ) -> Result<(), Interrupt> {
        self.enter(SessionPhase::Finalizing);
        self.encounter = Some(encounter.clone());

        let outcome = self.ledger.finalize(encounter.id).await?;
        self.finalize = Some(outcome);
        self.heartbeat().await;

        let reward =
            (encounter.verdict == Verdict::PlayerWin).then(|| challenge.reward().to_string());
        self.emit(ServerMessage::BattleEnd {
            encounter_id: encounter.id,
            winner_side: encounter.verdict.winner().unwrap_or(Side::Enemy),
            player_wins: encounter.player_wins,
            total_rounds: encounter.total_rounds,
            reward,
        })
        .await
    }

    /// Wait out `delay` while still serving heartbeats and noticing
    /// disconnects.
    async fn pause(&mut self, delay: Duration) -> Result<(), Interrupt> {
        if delay.is_zero() {
            return Ok(());
        }
        let deadline = Instant::now() + delay;

        loop {
            let message = tokio::select! {
                _ = sleep_until(deadline) => return Ok(()),
                message = self.inbound.recv() => message,
            };

            match message {
                None => return Err(Interrupt::Disconnected),
                Some(ClientMessage::Heartbeat) => self.heartbeat().await,
                Some(ClientMessage::Start) => {
                    let busy = RuntimeError::BattleInProgress;
                    warn!(error = %busy, "Ignoring start request");
                    self.emit(ServerMessage::error(busy.client_message()))
                        .await?;
                }
            }
        }
    }

    async fn heartbeat(&self) {
        match self
            .providers
            .activity
            .record_activity(self.ctx.game, utils::now())
            .await
        {
            Ok(()) => debug!("Activity recorded"),
            Err(error) => warn!(%error, "Failed to record activity"),
        }
    }

    async fn emit(&self, message: ServerMessage) -> Result<(), Interrupt> {
        debug!(kind = message.kind(), "Sending event");
        self.outbound
            .send(message)
            .await
            .map_err(|_| Interrupt::Disconnected)
    }

    fn enter(&mut self, next: SessionPhase) {
        debug!(from = %self.phase(), to = %next, "Session phase changed");
        self.phases.push(next);
    }
}
