//! Fighters: transient combat actors derived from an identity string.
//!
//! A [`Fighter`] lives for exactly one session. Its stats are derived once by
//! [`generate_fighter`] and may be mutated by ability effects during the
//! battle; nothing here is ever persisted.

mod generator;

pub use generator::{
    EASTER_EGG_TIERS, Potency, generate_fighter, hash_identity, loadout_seed, potency_for,
};

use core::fmt;

use crate::ability::AbilityId;
use crate::config::BattleConfig;

/// Opaque participant identifier (e.g. a chat-platform user id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A participant as handed over by the presentation layer: an identity
/// reference plus the display label the fighter is generated from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub label: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            label: label.into(),
        }
    }
}

/// Signed stat adjustment applied by buffs and debuffs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDelta {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl StatDelta {
    pub const NONE: Self = Self {
        attack: 0,
        defense: 0,
        speed: 0,
    };

    pub const fn attack(attack: i32) -> Self {
        Self {
            attack,
            defense: 0,
            speed: 0,
        }
    }

    pub const fn defense(defense: i32) -> Self {
        Self {
            attack: 0,
            defense,
            speed: 0,
        }
    }

    pub const fn speed(speed: i32) -> Self {
        Self {
            attack: 0,
            defense: 0,
            speed,
        }
    }

    pub const fn new(attack: i32, defense: i32, speed: i32) -> Self {
        Self {
            attack,
            defense,
            speed,
        }
    }

    pub const fn is_none(&self) -> bool {
        self.attack == 0 && self.defense == 0 && self.speed == 0
    }
}

/// Health of one fighter at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthSnapshot {
    pub participant: ParticipantId,
    pub hp: u32,
    pub max_hp: u32,
}

/// Combat-ready stat sheet owned by one session.
///
/// Invariant: `hp <= max_hp`. Attack, defense and speed never drop below
/// [`BattleConfig::STAT_FLOOR`] through debuffs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fighter {
    pub id: ParticipantId,
    pub label: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_chance: f64,
    pub abilities: [AbilityId; BattleConfig::LOADOUT_SIZE],
}

impl Fighter {
    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn missing_hp(&self) -> u32 {
        self.max_hp - self.hp
    }

    /// Reduce health, clamped at zero. Returns the health actually removed.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(damage);
        before - self.hp
    }

    /// Restore health, clamped at the maximum. Returns the health actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    /// Apply a buff/debuff. Increases are unbounded, decreases stop at the floor.
    pub fn apply_delta(&mut self, delta: StatDelta) {
        self.attack = shift_stat(self.attack, delta.attack);
        self.defense = shift_stat(self.defense, delta.defense);
        self.speed = shift_stat(self.speed, delta.speed);
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            participant: self.id.clone(),
            hp: self.hp,
            max_hp: self.max_hp,
        }
    }
}

fn shift_stat(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta as u32)
    } else {
        value
            .saturating_sub(delta.unsigned_abs())
            .max(BattleConfig::STAT_FLOOR)
    }
}
