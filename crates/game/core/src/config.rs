/// Battle mode flag carried by sessions, records and rating tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum BattleMode {
    /// Unranked battle, no consent required.
    Casual,
    /// Ranked battle, gated by the consent handshake.
    Competitive,
}

impl BattleMode {
    pub const fn is_competitive(self) -> bool {
        matches!(self, Self::Competitive)
    }
}

/// Combat constants and tunable parameters.
///
/// The defaults reproduce the live balance; tests override single fields to
/// force specific branches.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Probability that a turn uses an equipped ability instead of a basic attack.
    pub ability_chance: f64,
    /// Damage multiplier applied to a basic attack on a critical hit.
    pub crit_multiplier: f64,
    /// Defense rolls below this value are dodges (total negation).
    pub dodge_threshold: f64,
    /// Defense rolls below this value (and at or above the dodge threshold) are blocks.
    pub block_threshold: f64,
    /// Fraction of the defender's defense applied by piercing abilities.
    pub piercing_defense_factor: f64,
    /// Turn cap for casual sessions.
    pub casual_turn_cap: u32,
    /// Turn cap for competitive sessions.
    pub competitive_turn_cap: u32,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Number of abilities every fighter equips.
    pub const LOADOUT_SIZE: usize = 2;
    /// Stats lowered by effects never drop below this floor.
    pub const STAT_FLOOR: u32 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ABILITY_CHANCE: f64 = 0.25;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 1.8;
    pub const DEFAULT_DODGE_THRESHOLD: f64 = 0.15;
    pub const DEFAULT_BLOCK_THRESHOLD: f64 = 0.30;
    pub const DEFAULT_PIERCING_DEFENSE_FACTOR: f64 = 0.7;
    pub const DEFAULT_CASUAL_TURN_CAP: u32 = 25;
    pub const DEFAULT_COMPETITIVE_TURN_CAP: u32 = 50;

    pub fn new() -> Self {
        Self {
            ability_chance: Self::DEFAULT_ABILITY_CHANCE,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            dodge_threshold: Self::DEFAULT_DODGE_THRESHOLD,
            block_threshold: Self::DEFAULT_BLOCK_THRESHOLD,
            piercing_defense_factor: Self::DEFAULT_PIERCING_DEFENSE_FACTOR,
            casual_turn_cap: Self::DEFAULT_CASUAL_TURN_CAP,
            competitive_turn_cap: Self::DEFAULT_COMPETITIVE_TURN_CAP,
        }
    }

    /// Hard turn cap for the given mode.
    pub const fn turn_cap(&self, mode: BattleMode) -> u32 {
        match mode {
            BattleMode::Casual => self.casual_turn_cap,
            BattleMode::Competitive => self.competitive_turn_cap,
        }
    }

    /// Builder: never use abilities (basic attacks only).
    pub fn without_abilities(mut self) -> Self {
        self.ability_chance = 0.0;
        self
    }

    /// Builder: override both turn caps.
    pub fn with_turn_caps(mut self, casual: u32, competitive: u32) -> Self {
        self.casual_turn_cap = casual;
        self.competitive_turn_cap = competitive;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
