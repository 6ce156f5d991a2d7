//! Combat resolution system.
//!
//! Resolves exactly one turn between an attacker and a defender. All
//! randomness enters through a [`RollSource`], so the same rolls always
//! produce the same turn.
//!
//! # Core Functions
//!
//! - `resolve_turn`: ability-or-basic-attack resolution for one turn
//! - `DefenseOutcome::classify`: dodge / block / hit band selection
//! - `narration`: flavor-line pools for attacks, deaths and victories

mod defense;
mod event;
pub mod narration;
mod resolve;
mod roll;

pub use defense::DefenseOutcome;
pub use event::{TurnAction, TurnEvent};
pub use resolve::{TurnOutcome, resolve_turn};
pub use roll::{RollSource, SequenceRolls};
