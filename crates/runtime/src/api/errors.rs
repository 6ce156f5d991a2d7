//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from session admission, worker coordination and
//! repositories so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{CombatError, GeneratorError, ParticipantId};

pub use crate::repository::RepositoryError;

use super::types::ArenaId;
use crate::handshake::CancelReason;
use crate::lock::LockDenial;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("a participant cannot battle themselves ({participant})")]
    SameParticipant { participant: ParticipantId },

    #[error("competitive sessions must be started by a participant, not {initiator}")]
    InitiatorNotParticipant { initiator: ParticipantId },

    #[error("arena {arena} cannot start a session: {reason}")]
    LockDenied { arena: ArenaId, reason: LockDenial },

    #[error("consent handshake cancelled: {reason}")]
    HandshakeCancelled { reason: CancelReason },

    #[error("fighter generation failed")]
    GeneratorFailure(#[source] GeneratorError),

    #[error("session aborted by a combat fault")]
    SessionAborted(#[source] CombatError),

    #[error("session interrupted before settlement")]
    Interrupted,

    #[error("rating worker command channel closed")]
    RatingWorkerClosed,

    #[error("rating worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// True when the caller may simply try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockDenied { .. })
    }
}
