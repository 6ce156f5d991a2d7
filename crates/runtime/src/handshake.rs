//! Consent handshake for competitive sessions.
//!
//! ```text
//! Proposed ──(both Accept)──▶ Confirmed
//!     │
//!     ├──(either Declines)──▶ Cancelled(Declined)
//!     ├──(deadline)─────────▶ Cancelled(TimedOut)
//!     └──(abort)────────────▶ Cancelled(Aborted)
//! ```
//!
//! [`ConsentHandshake`] is the pure state machine; the session worker drives
//! it against a signal channel, a deadline timer and a cancellation token.

use core::fmt;

use battle_core::ParticipantId;
use serde::{Deserialize, Serialize};

/// A participant's answer to a ranked proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConsentDecision {
    Accept,
    Decline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSignal {
    pub from: ParticipantId,
    pub decision: ConsentDecision,
}

impl ConsentSignal {
    pub fn accept(from: impl Into<ParticipantId>) -> Self {
        Self {
            from: from.into(),
            decision: ConsentDecision::Accept,
        }
    }

    pub fn decline(from: impl Into<ParticipantId>) -> Self {
        Self {
            from: from.into(),
            decision: ConsentDecision::Decline,
        }
    }
}

/// Why a handshake ended without confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CancelReason {
    Declined { by: ParticipantId },
    /// Deadline passed; `pending` lists who never accepted.
    TimedOut { pending: Vec<ParticipantId> },
    Aborted,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined { by } => write!(f, "declined by {by}"),
            Self::TimedOut { pending } => {
                let pending: Vec<&str> = pending.iter().map(ParticipantId::as_str).collect();
                write!(f, "timed out waiting for {}", pending.join(", "))
            }
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    Proposed,
    Confirmed,
    Cancelled(CancelReason),
}

/// A signal that had no effect on the handshake.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignalRejection {
    #[error("{0} is not a participant of this session")]
    UnknownIdentity(ParticipantId),

    #[error("{0} already accepted")]
    AlreadyAccepted(ParticipantId),

    #[error("handshake already resolved")]
    AlreadyResolved,
}

#[derive(Clone, Debug)]
pub struct ConsentHandshake {
    participants: [ParticipantId; 2],
    accepted: [bool; 2],
    state: HandshakeState,
}

impl ConsentHandshake {
    pub fn new(participants: [ParticipantId; 2]) -> Self {
        Self {
            participants,
            accepted: [false; 2],
            state: HandshakeState::Proposed,
        }
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, HandshakeState::Proposed)
    }

    /// Participants that have not accepted yet.
    pub fn pending(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .zip(self.accepted)
            .filter(|(_, accepted)| !accepted)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Apply one signal. Rejected signals leave the state untouched.
    pub fn apply(&mut self, signal: &ConsentSignal) -> Result<&HandshakeState, SignalRejection> {
        if self.is_resolved() {
            return Err(SignalRejection::AlreadyResolved);
        }
        let slot = self
            .participants
            .iter()
            .position(|id| *id == signal.from)
            .ok_or_else(|| SignalRejection::UnknownIdentity(signal.from.clone()))?;

        match signal.decision {
            ConsentDecision::Decline => {
                self.state = HandshakeState::Cancelled(CancelReason::Declined {
                    by: signal.from.clone(),
                });
            }
            ConsentDecision::Accept => {
                if self.accepted[slot] {
                    return Err(SignalRejection::AlreadyAccepted(signal.from.clone()));
                }
                self.accepted[slot] = true;
                if self.accepted.iter().all(|accepted| *accepted) {
                    self.state = HandshakeState::Confirmed;
                }
            }
        }
        Ok(&self.state)
    }

    /// Deadline passed. No-op once resolved.
    pub fn expire(&mut self) -> &HandshakeState {
        if !self.is_resolved() {
            self.state = HandshakeState::Cancelled(CancelReason::TimedOut {
                pending: self.pending(),
            });
        }
        &self.state
    }

    /// External abort. No-op once resolved.
    pub fn abort(&mut self) -> &HandshakeState {
        if !self.is_resolved() {
            self.state = HandshakeState::Cancelled(CancelReason::Aborted);
        }
        &self.state
    }
}
