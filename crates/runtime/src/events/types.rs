//! Event types for different topics.

use battle_core::{BattleMode, Fighter, ParticipantId, TurnEvent};
use serde::{Deserialize, Serialize};

use crate::api::{ArenaId, SessionId};
use crate::handshake::CancelReason;

/// Events from the consent handshake (competitive sessions only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HandshakeEvent {
    /// A ranked session was proposed; both participants must accept in time.
    Proposed {
        session: SessionId,
        arena: ArenaId,
        participants: [ParticipantId; 2],
        deadline_secs: u64,
    },

    /// One participant accepted.
    Accepted {
        session: SessionId,
        by: ParticipantId,
    },

    /// Both accepted; the battle will start.
    Confirmed { session: SessionId },

    /// Declined, timed out or aborted. The lock is already released.
    Cancelled {
        session: SessionId,
        reason: CancelReason,
    },
}

/// Events from the turn loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// Fighters generated; the first turn follows after the start delay.
    Started {
        session: SessionId,
        arena: ArenaId,
        mode: BattleMode,
        fighters: Box<[Fighter; 2]>,
        first_mover: ParticipantId,
    },

    /// One fully resolved turn.
    Turn {
        session: SessionId,
        event: Box<TurnEvent>,
    },
}

impl HandshakeEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Proposed { session, .. }
            | Self::Accepted { session, .. }
            | Self::Confirmed { session }
            | Self::Cancelled { session, .. } => *session,
        }
    }
}

impl BattleEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Started { session, .. } | Self::Turn { session, .. } => *session,
        }
    }
}
