//! Session worker: one task per battle session.
//!
//! # Lifecycle
//!
//! ```text
//! [competitive] handshake ──Confirmed──▶ generate fighters ──▶ start delay
//!        │                                                         │
//!   Cancelled ──▶ release lock                      turn ──▶ pacing delay ──▶ turn ...
//!                                                                  │
//!                                          verdict ──▶ record (decisive only) ──▶ release lock
//! ```
//!
//! The lock guard is owned by the worker and dropped before the outcome is
//! published, so an observer of the outcome never sees the lock still held.
//! Cancellation is checked at every suspension point.

use std::sync::Arc;
use std::time::Duration;

use battle_core::combat::narration;
use battle_core::{
    AbilityCatalog, BattleConfig, BattleMode, BattleSession, Conclusion, Participant, Verdict,
    generate_fighter,
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::rating::{RatingHandle, RecordRequest};
use crate::api::{ArenaId, Result, RuntimeError, SessionId, SessionOutcome, Settlement};
use crate::events::{BattleEvent, Event, EventBus, HandshakeEvent};
use crate::handshake::{CancelReason, ConsentHandshake, ConsentSignal, HandshakeState};
use crate::lock::LockGuard;
use crate::rolls::RngRolls;

/// Timings a session worker runs with.
#[derive(Clone, Debug)]
pub(crate) struct SessionTimings {
    pub consent_deadline: Duration,
    pub start_delay: Duration,
    pub turn_delay: Duration,
}

/// Everything a session worker needs, assembled by the runtime.
pub(crate) struct SessionWorker {
    pub id: SessionId,
    pub arena: ArenaId,
    pub mode: BattleMode,
    pub participants: [Participant; 2],
    pub battle_config: BattleConfig,
    pub timings: SessionTimings,
    pub catalog: Arc<AbilityCatalog>,
    pub rolls: RngRolls,
    pub guard: LockGuard,
    pub signals: mpsc::UnboundedReceiver<ConsentSignal>,
    pub cancel: CancellationToken,
    pub events_tx: broadcast::Sender<Event>,
    pub bus: EventBus,
    pub rating: RatingHandle,
    pub outcome_tx: watch::Sender<Option<SessionOutcome>>,
}

impl SessionWorker {
    /// Main worker task.
    pub(crate) async fn run(mut self) {
        info!(
            session = %self.id,
            arena = %self.arena,
            mode = %self.mode,
            a = %self.participants[0].id,
            b = %self.participants[1].id,
            "session started"
        );

        let result = self.drive().await;
        let outcome = session_outcome(self.id, result);
        self.close(outcome);
    }

    /// Release the lock, then publish `outcome` to every observer.
    fn close(self, outcome: SessionOutcome) {
        let Self {
            id,
            guard,
            events_tx,
            bus,
            outcome_tx,
            ..
        } = self;
        drop(guard);

        info!(session = %id, settled = outcome.is_settled(), "session closed");
        let event = Event::Settlement(Box::new(outcome.clone()));
        let _ = events_tx.send(event.clone());
        bus.publish(event);
        outcome_tx.send_replace(Some(outcome));
    }

    fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event.clone());
        self.bus.publish(event);
    }

    /// Sleep for `duration` unless the session is cancelled first.
    async fn pause(&self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            return if self.cancel.is_cancelled() {
                Err(RuntimeError::Interrupted)
            } else {
                Ok(())
            };
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(RuntimeError::Interrupted),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    async fn drive(&mut self) -> Result<Settlement> {
        if self.mode.is_competitive() {
            self.negotiate().await?;
        }

        let fighters = [
            generate_fighter(&self.participants[0], &self.catalog)
                .map_err(RuntimeError::GeneratorFailure)?,
            generate_fighter(&self.participants[1], &self.catalog)
                .map_err(RuntimeError::GeneratorFailure)?,
        ];
        let [first, second] = fighters;
        let session = BattleSession::new(first, second, self.mode, self.battle_config.clone());
        self.fight(session).await
    }

    /// Announce the fighters, then resolve paced turns until a verdict.
    async fn fight(&mut self, mut session: BattleSession) -> Result<Settlement> {
        self.emit(Event::Battle(BattleEvent::Started {
            session: self.id,
            arena: self.arena.clone(),
            mode: self.mode,
            fighters: Box::new(session.fighters().clone()),
            first_mover: session.first_mover().id.clone(),
        }));
        self.pause(self.timings.start_delay).await?;

        loop {
            let event = session
                .step(&self.catalog, &mut self.rolls)
                .map_err(RuntimeError::SessionAborted)?;
            debug!(
                session = %self.id,
                turn = event.turn,
                actor = %event.actor,
                action = %event.action,
                damage = event.damage,
                "turn resolved"
            );
            self.emit(Event::Battle(BattleEvent::Turn {
                session: self.id,
                event: Box::new(event),
            }));

            if session.is_finished() {
                break;
            }
            self.pause(self.timings.turn_delay).await?;
        }

        let conclusion = session.conclusion().ok_or(RuntimeError::SessionAborted(
            battle_core::CombatError::AlreadyConcluded {
                turns: session.turns(),
            },
        ))?;
        self.settle(conclusion).await
    }

    async fn negotiate(&mut self) -> Result<()> {
        let mut handshake =
            ConsentHandshake::new(self.participants.clone().map(|participant| participant.id));
        self.emit(Event::Handshake(HandshakeEvent::Proposed {
            session: self.id,
            arena: self.arena.clone(),
            participants: self.participants.clone().map(|participant| participant.id),
            deadline_secs: self.timings.consent_deadline.as_secs(),
        }));

        let deadline = tokio::time::sleep(self.timings.consent_deadline);
        tokio::pin!(deadline);
        let mut signals_open = true;

        let state = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break handshake.abort().clone(),
                signal = self.signals.recv(), if signals_open => {
                    let Some(signal) = signal else {
                        signals_open = false;
                        continue;
                    };
                    match handshake.apply(&signal) {
                        Ok(HandshakeState::Proposed) => {
                            debug!(session = %self.id, by = %signal.from, "consent accepted");
                            self.emit(Event::Handshake(HandshakeEvent::Accepted {
                                session: self.id,
                                by: signal.from,
                            }));
                        }
                        Ok(state) => break state.clone(),
                        Err(rejection) => {
                            warn!(session = %self.id, "consent signal rejected: {}", rejection);
                        }
                    }
                }
                _ = &mut deadline => break handshake.expire().clone(),
            }
        };

        match state {
            HandshakeState::Confirmed => {
                info!(session = %self.id, "consent confirmed");
                self.emit(Event::Handshake(HandshakeEvent::Confirmed { session: self.id }));
                Ok(())
            }
            HandshakeState::Cancelled(reason) => {
                info!(session = %self.id, %reason, "consent handshake cancelled");
                self.emit(Event::Handshake(HandshakeEvent::Cancelled {
                    session: self.id,
                    reason: reason.clone(),
                }));
                Err(RuntimeError::HandshakeCancelled { reason })
            }
            HandshakeState::Proposed => Err(RuntimeError::Interrupted),
        }
    }

    async fn settle(&mut self, conclusion: Conclusion) -> Result<Settlement> {
        let Conclusion {
            verdict,
            turns,
            health,
        } = conclusion;

        let mut epilogue = Vec::new();
        let mut record = None;

        if let Verdict::Victory {
            winner,
            loser,
            by_stoppage,
        } = &verdict
        {
            let (winner, loser) = self.pair(winner, loser);
            if !by_stoppage {
                epilogue.push(narration::death_line(&loser.label, &mut self.rolls));
            }
            epilogue.push(narration::victory_line(&winner.label, &mut self.rolls));

            let winner_health = health
                .iter()
                .find(|snapshot| snapshot.participant == winner.id)
                .map(|snapshot| (snapshot.hp, snapshot.max_hp))
                .unwrap_or_default();

            let request = RecordRequest {
                arena: self.arena.clone(),
                winner: winner.clone(),
                loser: loser.clone(),
                turns,
                winner_hp: winner_health.0,
                winner_max_hp: winner_health.1,
                mode: self.mode,
            };
            match self.rating.record_battle(request).await {
                Ok(saved) => record = Some(saved),
                Err(e) => error!(session = %self.id, "failed to record battle: {}", e),
            }
        }

        info!(session = %self.id, turns, ?verdict, "session settled");
        Ok(Settlement {
            session: self.id,
            arena: self.arena.clone(),
            mode: self.mode,
            verdict,
            turns,
            health,
            epilogue,
            record,
        })
    }

    fn pair(
        &self,
        winner: &battle_core::ParticipantId,
        loser: &battle_core::ParticipantId,
    ) -> (Participant, Participant) {
        let find = |id: &battle_core::ParticipantId| {
            self.participants
                .iter()
                .find(|participant| participant.id == *id)
                .cloned()
                .unwrap_or_else(|| Participant {
                    id: id.clone(),
                    label: id.to_string(),
                })
        };
        (find(winner), find(loser))
    }
}

fn session_outcome(session: SessionId, result: Result<Settlement>) -> SessionOutcome {
    match result {
        Ok(settlement) => SessionOutcome::Settled(settlement),
        Err(RuntimeError::HandshakeCancelled {
            reason: CancelReason::Aborted,
        })
        | Err(RuntimeError::Interrupted) => SessionOutcome::Aborted { session },
        Err(RuntimeError::HandshakeCancelled { reason }) => {
            SessionOutcome::Cancelled { session, reason }
        }
        Err(e) => {
            error!(%session, "session failed: {}", e);
            SessionOutcome::Failed {
                session,
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::SessionLockRegistry;
    use crate::repository::InMemoryRatingRepository;
    use crate::workers::RatingWorker;
    use battle_core::{AbilityId, CombatError, Fighter, GeneratorError, ParticipantId};

    struct Harness {
        worker: SessionWorker,
        locks: SessionLockRegistry,
        rating: RatingHandle,
        outcome_rx: watch::Receiver<Option<SessionOutcome>>,
        events_rx: broadcast::Receiver<Event>,
    }

    fn harness(battle_config: BattleConfig) -> Harness {
        let arena = ArenaId::new("guild");
        let participants = [
            Participant::new("1001", "Alice"),
            Participant::new("1002", "Bob"),
        ];
        let locks = SessionLockRegistry::new(Duration::from_secs(300));
        let guard = locks
            .try_acquire(&arena, &[participants[0].id.clone(), participants[1].id.clone()])
            .unwrap();

        let (command_tx, command_rx) = mpsc::channel(8);
        let rating_worker =
            RatingWorker::new(Arc::new(InMemoryRatingRepository::new()), command_rx).unwrap();
        tokio::spawn(rating_worker.run());
        let rating = RatingHandle::new(command_tx);

        let (_signal_tx, signals) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = broadcast::channel(64);
        let (outcome_tx, outcome_rx) = watch::channel(None);

        let worker = SessionWorker {
            id: SessionId(1),
            arena,
            mode: BattleMode::Casual,
            participants,
            battle_config,
            timings: SessionTimings {
                consent_deadline: Duration::from_secs(15),
                start_delay: Duration::ZERO,
                turn_delay: Duration::ZERO,
            },
            catalog: Arc::new(AbilityCatalog::standard()),
            rolls: RngRolls::seeded(7),
            guard,
            signals,
            cancel: CancellationToken::new(),
            events_tx,
            bus: EventBus::new(),
            rating: rating.clone(),
            outcome_tx,
        };

        Harness {
            worker,
            locks,
            rating,
            outcome_rx,
            events_rx,
        }
    }

    fn fighter(id: &str, loadout: [u16; 2]) -> Fighter {
        Fighter {
            id: ParticipantId::new(id),
            label: id.to_owned(),
            hp: 100,
            max_hp: 100,
            attack: 20,
            defense: 10,
            speed: 15,
            crit_chance: 0.1,
            abilities: loadout.map(AbilityId),
        }
    }

    #[tokio::test]
    async fn missing_loadout_ability_fails_and_releases_the_lock() {
        let config = BattleConfig {
            ability_chance: 1.0,
            ..BattleConfig::default()
        };
        let Harness {
            mut worker,
            locks,
            rating,
            outcome_rx,
            mut events_rx,
        } = harness(config.clone());
        let arena = worker.arena.clone();
        let session = BattleSession::new(
            fighter("1001", [40, 41]),
            fighter("1002", [42, 43]),
            BattleMode::Casual,
            config,
        );

        let result = worker.fight(session).await;
        assert!(matches!(
            result,
            Err(RuntimeError::SessionAborted(CombatError::UnknownAbility { .. }))
        ));

        let outcome = session_outcome(worker.id, result);
        assert!(matches!(outcome, SessionOutcome::Failed { .. }));
        worker.close(outcome);

        assert!(!locks.is_locked(&arena));
        assert!(!locks.is_participant_busy(&ParticipantId::new("1001")));
        assert!(!locks.is_participant_busy(&ParticipantId::new("1002")));
        assert!(matches!(
            *outcome_rx.borrow(),
            Some(SessionOutcome::Failed { .. })
        ));

        // No turn was committed between the announcement and the settlement.
        assert!(matches!(
            events_rx.recv().await.unwrap(),
            Event::Battle(BattleEvent::Started { .. })
        ));
        assert!(matches!(events_rx.recv().await.unwrap(), Event::Settlement(_)));

        let history = rating
            .history(&ParticipantId::new("1001"), 10, None)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn errors_map_to_outcomes() {
        let id = SessionId(3);
        assert!(matches!(
            session_outcome(id, Err(RuntimeError::Interrupted)),
            SessionOutcome::Aborted { .. }
        ));
        assert!(matches!(
            session_outcome(
                id,
                Err(RuntimeError::HandshakeCancelled {
                    reason: CancelReason::Aborted
                })
            ),
            SessionOutcome::Aborted { .. }
        ));
        assert!(matches!(
            session_outcome(
                id,
                Err(RuntimeError::GeneratorFailure(GeneratorError::CatalogTooSmall {
                    available: 0,
                    required: 2,
                }))
            ),
            SessionOutcome::Failed { .. }
        ));
    }
}
