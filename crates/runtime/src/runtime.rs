//! High-level runtime.
//!
//! The runtime owns the shared executor, ledger and collaborator handles, and
//! exposes a builder-based API for opening sessions and reaching the service
//! façade.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use battle_core::AchievementCatalog;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{BattleService, Providers, Result, RuntimeError};
use crate::executor::EncounterExecutor;
use crate::ledger::ProgressionLedger;
use crate::repository::Repositories;
use crate::session::{
    BattleSession, ClientMessage, PacingConfig, ServerMessage, SessionContext, SessionReport,
};

/// Runtime configuration shared by every session.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub pacing: PacingConfig,
    /// Capacity of the client → session channel.
    pub inbound_buffer: usize,
    /// Capacity of the session → client channel.
    pub outbound_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            inbound_buffer: 16,
            outbound_buffer: 64,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BATTLE_START_DELAY_MS`, `BATTLE_ROUND_START_DELAY_MS`,
    ///   `BATTLE_REVEAL_DELAY_MS`, `BATTLE_ANIMATION_DELAY_MS`,
    ///   `BATTLE_RESULT_DELAY_MS` override single delays
    /// - `BATTLE_PACING_SCALE` multiplies every delay afterwards (`0` disables
    ///   pacing)
    /// - `SESSION_INBOUND_BUFFER` / `SESSION_OUTBOUND_BUFFER`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let pacing = &mut config.pacing;

        if let Some(ms) = read_env::<u64>("BATTLE_START_DELAY_MS") {
            pacing.battle_start_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BATTLE_ROUND_START_DELAY_MS") {
            pacing.round_start_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BATTLE_REVEAL_DELAY_MS") {
            pacing.reveal_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BATTLE_ANIMATION_DELAY_MS") {
            pacing.animation_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BATTLE_RESULT_DELAY_MS") {
            pacing.result_delay = Duration::from_millis(ms);
        }
        if let Some(scale) = read_env::<f64>("BATTLE_PACING_SCALE") {
            config.pacing = config.pacing.scaled(scale);
        }

        if let Some(capacity) = read_env::<usize>("SESSION_INBOUND_BUFFER") {
            config.inbound_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SESSION_OUTBOUND_BUFFER") {
            config.outbound_buffer = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Client side of a spawned session.
pub struct SessionHandle {
    /// Requests from the client. Dropping it signals a disconnect.
    pub inbound: mpsc::Sender<ClientMessage>,
    /// Events for the client.
    pub outbound: mpsc::Receiver<ServerMessage>,
    pub task: JoinHandle<SessionReport>,
}

/// Shared battle runtime.
///
/// Cheap to share behind an [`Arc`]; every session borrows the same executor,
/// ledger and collaborators.
pub struct BattleRuntime {
    config: RuntimeConfig,
    repos: Repositories,
    providers: Providers,
    executor: EncounterExecutor,
    ledger: Arc<ProgressionLedger>,
}

impl BattleRuntime {
    pub fn builder() -> BattleRuntimeBuilder {
        BattleRuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn ledger(&self) -> &Arc<ProgressionLedger> {
        &self.ledger
    }

    pub fn service(&self) -> BattleService {
        BattleService::new(
            self.repos.clone(),
            self.providers.clone(),
            self.ledger.clone(),
        )
    }

    /// Build a session over caller-provided channels.
    pub fn session(
        &self,
        ctx: SessionContext,
        inbound: mpsc::Receiver<ClientMessage>,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> BattleSession {
        BattleSession::new(
            ctx,
            self.config.pacing,
            self.executor.clone(),
            self.ledger.clone(),
            self.providers.clone(),
            inbound,
            outbound,
        )
    }

    /// Create the channels for a session and run it on its own task.
    pub fn spawn_session(&self, ctx: SessionContext) -> SessionHandle {
        let (inbound_tx, inbound_rx) = mpsc::channel(self.config.inbound_buffer);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_buffer);

        let session = self.session(ctx, inbound_rx, outbound_tx);
        let task = tokio::spawn(session.run());

        SessionHandle {
            inbound: inbound_tx,
            outbound: outbound_rx,
            task,
        }
    }
}

/// Builder for [`BattleRuntime`].
pub struct BattleRuntimeBuilder {
    config: RuntimeConfig,
    repos: Option<Repositories>,
    providers: Option<Providers>,
    catalog: Option<AchievementCatalog>,
}

impl BattleRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repos: None,
            providers: None,
            catalog: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pacing(mut self, pacing: PacingConfig) -> Self {
        self.config.pacing = pacing;
        self
    }

    /// Record storage. Defaults to a fresh in-memory store.
    pub fn repositories(mut self, repos: Repositories) -> Self {
        self.repos = Some(repos);
        self
    }

    /// Set required collaborators
    pub fn providers(mut self, providers: Providers) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Achievement definitions. Defaults to [`AchievementCatalog::standard`].
    pub fn catalog(mut self, catalog: AchievementCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<BattleRuntime> {
        let providers = self.providers.ok_or(RuntimeError::MissingProviders)?;
        let repos = self.repos.unwrap_or_else(Repositories::in_memory);
        let catalog = Arc::new(self.catalog.unwrap_or_else(AchievementCatalog::standard));

        Ok(BattleRuntime {
            config: self.config,
            executor: EncounterExecutor::new(repos.clone()),
            ledger: Arc::new(ProgressionLedger::new(repos.clone(), catalog)),
            repos,
            providers,
        })
    }
}
