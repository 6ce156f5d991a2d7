//! Cloneable façade for one running session.
//!
//! [`SessionHandle`] hides channel plumbing: consent signals go in through an
//! unbounded sender, events come out through a per-session broadcast and the
//! terminal outcome is published on a watch channel.
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use battle_core::{BattleMode, Participant, ParticipantId};

use super::types::{ArenaId, SessionId, SessionOutcome, Settlement};
use crate::events::{Event, EventStream};
use crate::handshake::ConsentSignal;

struct Inner {
    id: SessionId,
    arena: ArenaId,
    mode: BattleMode,
    participants: [Participant; 2],
    signal_tx: mpsc::UnboundedSender<ConsentSignal>,
    cancel: CancellationToken,
    events_tx: broadcast::Sender<Event>,
    /// Receiver created before the worker spawned, so the first caller of
    /// [`SessionHandle::events`] cannot miss early events.
    primary_rx: Mutex<Option<broadcast::Receiver<Event>>>,
    outcome_rx: watch::Receiver<Option<SessionOutcome>>,
}

/// Client-facing handle to a single session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: SessionId,
        arena: ArenaId,
        mode: BattleMode,
        participants: [Participant; 2],
        signal_tx: mpsc::UnboundedSender<ConsentSignal>,
        cancel: CancellationToken,
        events_tx: broadcast::Sender<Event>,
        primary_rx: broadcast::Receiver<Event>,
        outcome_rx: watch::Receiver<Option<SessionOutcome>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                arena,
                mode,
                participants,
                signal_tx,
                cancel,
                events_tx,
                primary_rx: Mutex::new(Some(primary_rx)),
                outcome_rx,
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn arena(&self) -> &ArenaId {
        &self.inner.arena
    }

    pub fn mode(&self) -> BattleMode {
        self.inner.mode
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.inner.participants
    }

    /// Accept a competitive session on behalf of `participant`.
    ///
    /// Returns false once the session no longer listens for consent.
    pub fn signal_accept(&self, participant: impl Into<ParticipantId>) -> bool {
        self.inner
            .signal_tx
            .send(ConsentSignal::accept(participant))
            .is_ok()
    }

    /// Decline a competitive session on behalf of `participant`.
    pub fn signal_decline(&self, participant: impl Into<ParticipantId>) -> bool {
        self.inner
            .signal_tx
            .send(ConsentSignal::decline(participant))
            .is_ok()
    }

    /// Stop the session at its next suspension point. No record is written.
    pub fn abort(&self) {
        self.inner.cancel.cancel();
    }

    /// Stream of this session's events, ending after its settlement.
    ///
    /// The first call receives every event since the session started; later
    /// calls see events from the moment of the call.
    pub fn events(&self) -> EventStream {
        let primary = self
            .inner
            .primary_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        EventStream::new(primary.unwrap_or_else(|| self.inner.events_tx.subscribe()))
    }

    /// Raw receiver of this session's events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events_tx.subscribe()
    }

    /// Terminal outcome, if the session already finished.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.inner.outcome_rx.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.outcome_rx.borrow().is_some()
    }

    /// Wait for the terminal outcome.
    pub async fn settled(&self) -> SessionOutcome {
        let mut rx = self.inner.outcome_rx.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or_else(|| self.lost()),
            Err(_) => self.lost(),
        }
    }

    /// Run `callback` once the session settles with a result.
    ///
    /// Fires for draws as well as victories; never fires for cancelled or
    /// aborted sessions.
    pub fn on_settled<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Settlement) + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            if let SessionOutcome::Settled(settlement) = handle.settled().await {
                callback(settlement);
            }
        })
    }

    fn lost(&self) -> SessionOutcome {
        SessionOutcome::Failed {
            session: self.inner.id,
            error: "session worker stopped without an outcome".to_owned(),
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("arena", &self.inner.arena)
            .field("mode", &self.inner.mode)
            .finish()
    }
}
