//! Identifiers and outcome types shared by the runtime API.

use core::fmt;

use battle_core::{BattleMode, HealthSnapshot, ParticipantId, Verdict};
use serde::{Deserialize, Serialize};

use crate::handshake::CancelReason;
use crate::repository::BattleRecord;

/// Scope within which a session lock is held (e.g. a community or guild).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub String);

impl ArenaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArenaId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArenaId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Runtime-local session number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// A concluded battle, as handed to `on_settled` callbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub session: SessionId,
    pub arena: ArenaId,
    pub mode: BattleMode,
    pub verdict: Verdict,
    pub turns: u32,
    /// Final health of both fighters, in participant order.
    pub health: [HealthSnapshot; 2],
    /// Closing flavor lines (death line for a knockout, then the victory line).
    pub epilogue: Vec<String>,
    /// The persisted record; `None` for a draw or when persistence failed.
    pub record: Option<BattleRecord>,
}

impl Settlement {
    pub fn winner(&self) -> Option<&ParticipantId> {
        self.verdict.winner()
    }

    pub fn loser(&self) -> Option<&ParticipantId> {
        self.verdict.loser()
    }
}

/// Terminal state of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The turn loop ran to a verdict.
    Settled(Settlement),
    /// The consent handshake did not confirm; no fighter was created.
    Cancelled {
        session: SessionId,
        reason: CancelReason,
    },
    /// Aborted through [`crate::SessionHandle::abort`] or runtime shutdown.
    Aborted { session: SessionId },
    /// Generator or resolver failure; nothing was recorded.
    Failed { session: SessionId, error: String },
}

impl SessionOutcome {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Settled(settlement) => settlement.session,
            Self::Cancelled { session, .. }
            | Self::Aborted { session }
            | Self::Failed { session, .. } => *session,
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match self {
            Self::Settled(settlement) => Some(settlement),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}
