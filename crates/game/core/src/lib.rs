//! Deterministic battle rules shared by the runtime and offline tools.
//!
//! `battle-core` defines fighter generation, the ability catalog, single-turn
//! combat resolution, the session turn loop and the rating formulas. Nothing
//! here performs I/O or owns randomness: callers inject a [`RollSource`] and
//! receive plain data back.
pub mod ability;
pub mod combat;
pub mod config;
pub mod error;
pub mod fighter;
pub mod rating;
pub mod session;

pub use ability::{
    AbilityCatalog, AbilityEffect, AbilityId, EffectKind, EffectOutcome, HitCount, Mitigation,
    SideEffects,
};
pub use combat::{
    DefenseOutcome, RollSource, SequenceRolls, TurnAction, TurnEvent, TurnOutcome, resolve_turn,
};
pub use config::{BattleConfig, BattleMode};
pub use error::{BattleError, CombatError, ErrorSeverity, GeneratorError};
pub use fighter::{
    Fighter, HealthSnapshot, Participant, ParticipantId, Potency, StatDelta, generate_fighter,
    hash_identity, potency_for,
};
pub use rating::{TrackRecord, minimum_battles, weighted_score, win_rate};
pub use session::{BattleSession, Conclusion, Verdict};
