//! High-level battle orchestrator.
//!
//! The runtime owns the lock registry, the rating worker and the event bus,
//! admits new sessions and spawns one worker task per admitted session.
//! [`SessionHandle`] is the per-session façade handed back to callers.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use battle_core::{AbilityCatalog, BattleConfig, BattleMode, Participant, ParticipantId};

use crate::api::{ArenaId, Result, RuntimeError, SessionHandle, SessionId};
use crate::events::{Event, EventBus, Topic};
use crate::lock::SessionLockRegistry;
use crate::repository::{FileRatingRepository, InMemoryRatingRepository, RatingRepository};
use crate::rolls::RngRolls;
use crate::workers::{RatingHandle, RatingWorker, SessionTimings, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Age after which a lock entry counts as abandoned.
    pub lock_timeout: Duration,
    /// How long both participants have to accept a competitive session.
    pub consent_deadline: Duration,
    /// Pause between the start announcement and the first turn.
    pub start_delay: Duration,
    /// Pause between consecutive turns.
    pub turn_delay: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Makes every session's draws reproducible. Session `n` uses `seed + n`.
    pub rng_seed: Option<u64>,
    /// Directory for the JSON repositories. In-memory storage when unset.
    pub data_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Configuration without pacing delays, for tests and offline tools.
    pub fn instant() -> Self {
        Self {
            start_delay: Duration::ZERO,
            turn_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            lock_timeout: SessionLockRegistry::DEFAULT_TIMEOUT,
            consent_deadline: Duration::from_secs(15),
            start_delay: Duration::from_secs(3),
            turn_delay: Duration::from_secs(2),
            event_buffer_size: 100,
            command_buffer_size: 32,
            rng_seed: None,
            data_dir: None,
        }
    }
}

/// Everything needed to start one session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub arena: ArenaId,
    pub participants: [Participant; 2],
    pub mode: BattleMode,
    /// Who asked for the session. Competitive sessions must be started by
    /// one of the two participants.
    pub initiator: Option<ParticipantId>,
}

impl SessionRequest {
    pub fn new(
        arena: impl Into<ArenaId>,
        first: Participant,
        second: Participant,
        mode: BattleMode,
    ) -> Self {
        Self {
            arena: arena.into(),
            participants: [first, second],
            mode,
            initiator: None,
        }
    }

    pub fn initiated_by(mut self, initiator: impl Into<ParticipantId>) -> Self {
        self.initiator = Some(initiator.into());
        self
    }
}

/// Main runtime that admits and supervises battle sessions
///
/// Design: Runtime owns the shared registries and the rating worker; every
/// admitted session runs in its own task and is reached through its
/// [`SessionHandle`].
pub struct BattleRuntime {
    config: RuntimeConfig,
    catalog: Arc<AbilityCatalog>,
    locks: SessionLockRegistry,
    rating: RatingHandle,
    bus: EventBus,
    sequence: AtomicU64,
    shutdown: CancellationToken,
    rating_worker_handle: JoinHandle<()>,
}

impl BattleRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Admit a session and spawn its worker.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::SameParticipant`] when both participants share an id
    /// - [`RuntimeError::InitiatorNotParticipant`] for a competitive session
    ///   started by an outsider
    /// - [`RuntimeError::LockDenied`] when the arena or a participant is busy
    ///
    /// Nothing is created when admission fails.
    pub fn start_session(&self, request: SessionRequest) -> Result<SessionHandle> {
        let SessionRequest {
            arena,
            participants,
            mode,
            initiator,
        } = request;

        if participants[0].id == participants[1].id {
            return Err(RuntimeError::SameParticipant {
                participant: participants[0].id.clone(),
            });
        }
        if let Some(initiator) = initiator.filter(|initiator| {
            mode.is_competitive() && !participants.iter().any(|p| p.id == *initiator)
        }) {
            return Err(RuntimeError::InitiatorNotParticipant { initiator });
        }

        let ids = [participants[0].id.clone(), participants[1].id.clone()];
        let guard = self
            .locks
            .try_acquire(&arena, &ids)
            .map_err(|reason| RuntimeError::LockDenied {
                arena: arena.clone(),
                reason,
            })?;

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = SessionId(seq);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (events_tx, primary_rx) = broadcast::channel(self.config.event_buffer_size);
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let cancel = self.shutdown.child_token();

        let worker = SessionWorker {
            id,
            arena: arena.clone(),
            mode,
            participants: participants.clone(),
            battle_config: self.config.battle.clone(),
            timings: SessionTimings {
                consent_deadline: self.config.consent_deadline,
                start_delay: self.config.start_delay,
                turn_delay: self.config.turn_delay,
            },
            catalog: Arc::clone(&self.catalog),
            rolls: RngRolls::new(self.config.rng_seed.map(|seed| seed.wrapping_add(seq))),
            guard,
            signals: signal_rx,
            cancel: cancel.clone(),
            events_tx: events_tx.clone(),
            bus: self.bus.clone(),
            rating: self.rating.clone(),
            outcome_tx,
        };

        debug!(session = %id, arena = %arena, %mode, "session admitted");
        tokio::spawn(worker.run());

        Ok(SessionHandle::new(
            id,
            arena,
            mode,
            participants,
            signal_tx,
            cancel,
            events_tx,
            primary_rx,
            outcome_rx,
        ))
    }

    /// Shared lock registry. Other collaborators may consult it read-only.
    pub fn locks(&self) -> &SessionLockRegistry {
        &self.locks
    }

    /// Client of the rating worker for profile and leaderboard queries.
    pub fn rating(&self) -> RatingHandle {
        self.rating.clone()
    }

    /// Subscribe to events of every session on one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Abort every live session, then stop the rating worker.
    ///
    /// Settlements already queued on the rating worker are applied first.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();
        self.rating.shutdown().await?;

        self.rating_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!("battle runtime stopped");
        Ok(())
    }
}

/// Builder for [`BattleRuntime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    repository: Option<Arc<dyn RatingRepository>>,
    catalog: Option<AbilityCatalog>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repository: None,
            catalog: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific rating repository instead of the one derived from
    /// [`RuntimeConfig::data_dir`].
    pub fn repository(mut self, repository: Arc<dyn RatingRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Replace the standard ability catalog.
    pub fn catalog(mut self, catalog: AbilityCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the runtime and spawn the rating worker.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<BattleRuntime> {
        let repository: Arc<dyn RatingRepository> = match (self.repository, &self.config.data_dir)
        {
            (Some(repository), _) => repository,
            (None, Some(dir)) => Arc::new(FileRatingRepository::new(dir)?),
            (None, None) => Arc::new(InMemoryRatingRepository::new()),
        };

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let worker = RatingWorker::new(repository, command_rx)?;
        let rating_worker_handle = tokio::spawn(worker.run());

        info!(
            data_dir = ?self.config.data_dir,
            seeded = self.config.rng_seed.is_some(),
            "battle runtime started"
        );

        Ok(BattleRuntime {
            locks: SessionLockRegistry::new(self.config.lock_timeout),
            rating: RatingHandle::new(command_tx),
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            catalog: Arc::new(self.catalog.unwrap_or_else(AbilityCatalog::standard)),
            sequence: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
            config: self.config,
            rating_worker_handle,
        })
    }
}
