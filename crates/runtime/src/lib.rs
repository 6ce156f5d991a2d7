//! Runtime orchestration for battle sessions.
//!
//! This crate wires together the session lock, the consent handshake, the
//! rating worker and the repositories into a cohesive runtime API. Consumers
//! embed [`BattleRuntime`] to start sessions and interact with each of them
//! through its [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`lock`] and [`handshake`] hold the admission and consent state machines
//! - [`repository`] persists battle records and rating profiles
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod handshake;
pub mod lock;
pub mod repository;
pub mod rolls;
pub mod runtime;

mod workers;

pub use api::{
    ArenaId, Result, RuntimeError, SessionHandle, SessionId, SessionOutcome, Settlement,
};
pub use events::{BattleEvent, Event, EventBus, EventStream, HandshakeEvent, Topic};
pub use handshake::{
    CancelReason, ConsentDecision, ConsentHandshake, ConsentSignal, HandshakeState,
    SignalRejection,
};
pub use lock::{LockDenial, LockGuard, SessionLockRegistry};
pub use repository::{
    BattleRecord, FileRatingRepository, InMemoryRatingRepository, LeaderboardEntry,
    RatingProfile, RatingRepository, RepositoryError, TrackStats,
};
pub use rolls::RngRolls;
pub use runtime::{BattleRuntime, RuntimeBuilder, RuntimeConfig, SessionRequest};
pub use workers::{RatingHandle, RecordRequest};
