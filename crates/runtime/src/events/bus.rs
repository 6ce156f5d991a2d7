//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{BattleEvent, HandshakeEvent};
use crate::api::{SessionId, SessionOutcome};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Consent handshake progress
    Handshake,
    /// Session start and resolved turns
    Battle,
    /// Terminal session outcomes
    Settlement,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Handshake(HandshakeEvent),
    Battle(BattleEvent),
    /// Last event of every session.
    Settlement(Box<SessionOutcome>),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Handshake(_) => Topic::Handshake,
            Event::Battle(_) => Topic::Battle,
            Event::Settlement(_) => Topic::Settlement,
        }
    }

    pub fn session(&self) -> SessionId {
        match self {
            Event::Handshake(event) => event.session(),
            Event::Battle(event) => event.session(),
            Event::Settlement(outcome) => outcome.session(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Settlement(_))
    }
}

/// Topic-based event bus
///
/// Carries events of every session in the runtime. Consumers subscribe to the
/// topics they care about; per-session streams live on
/// [`crate::SessionHandle`].
#[derive(Clone)]
pub struct EventBus {
    handshake: broadcast::Sender<Event>,
    battle: broadcast::Sender<Event>,
    settlement: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handshake: broadcast::channel(capacity).0,
            battle: broadcast::channel(capacity).0,
            settlement: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Handshake => &self.handshake,
            Topic::Battle => &self.battle,
            Topic::Settlement => &self.settlement,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for one session's events, ending after its settlement.
pub struct EventStream {
    rx: broadcast::Receiver<Event>,
    finished: bool,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<Event>) -> Self {
        Self {
            rx,
            finished: false,
        }
    }

    /// Next event, or `None` once the session's settlement was delivered.
    ///
    /// A subscriber that falls behind skips the dropped events.
    pub async fn next(&mut self) -> Option<Event> {
        if self.finished {
            return None;
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    self.finished = event.is_terminal();
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    /// Drain the stream to completion.
    pub async fn collect(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}
