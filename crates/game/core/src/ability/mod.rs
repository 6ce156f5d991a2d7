//! Ability catalog - a registry of tagged effect records.
//!
//! Each [`AbilityEffect`] pairs a name and narration template with an
//! [`EffectKind`] (the resolution rule) and a [`Mitigation`] (how the
//! defender's defense reduces whatever damage the effect produced). The turn
//! resolver only ever talks to this interface, so new abilities are added by
//! registering a record, never by touching the combat algorithm.
//!
//! # Execution order
//!
//! 1. Side effects on caster and target (stat riders)
//! 2. The effect kind resolves (damage, heal, buff, debuff)
//! 3. Mitigation pass on any damage produced
//! 4. Damage is applied to the defender (clamped at zero)

mod catalog;
mod kinds;

pub use catalog::AbilityCatalog;
pub use kinds::{EffectKind, EffectOutcome, HitCount};

use crate::combat::RollSource;
use crate::config::BattleConfig;
use crate::fighter::{Fighter, StatDelta};

/// Position of an entry in its [`AbilityCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub u16);

/// How defense reduces ability damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mitigation {
    /// Reduced by half the defender's defense.
    Standard,
    /// Reduced by [`BattleConfig::piercing_defense_factor`] of the defender's defense.
    Piercing,
}

impl Mitigation {
    /// Apply the mitigation pass. Damage that got through stays at least 1.
    pub fn apply(self, damage: u32, defense: u32, config: &BattleConfig) -> u32 {
        let reduction = match self {
            Self::Standard => defense / 2,
            Self::Piercing => (f64::from(defense) * config.piercing_defense_factor).floor() as u32,
        };
        damage.saturating_sub(reduction).max(1)
    }
}

/// Stat riders applied before the effect itself resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SideEffects {
    pub caster: StatDelta,
    pub target: StatDelta,
}

impl SideEffects {
    pub const NONE: Self = Self {
        caster: StatDelta::NONE,
        target: StatDelta::NONE,
    };
}

/// Immutable catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityEffect {
    pub name: &'static str,
    pub kind: EffectKind,
    pub mitigation: Mitigation,
    pub side_effects: SideEffects,
    /// Template with `{attacker}`, `{defender}` and `{value}` placeholders.
    pub narration: &'static str,
    /// Template used when a conditional effect takes its heal branch.
    pub heal_narration: Option<&'static str>,
}

impl AbilityEffect {
    pub const fn new(name: &'static str, kind: EffectKind, narration: &'static str) -> Self {
        Self {
            name,
            kind,
            mitigation: Mitigation::Standard,
            side_effects: SideEffects::NONE,
            narration,
            heal_narration: None,
        }
    }

    /// Builder: set mitigation.
    pub fn mitigation(mut self, mitigation: Mitigation) -> Self {
        self.mitigation = mitigation;
        self
    }

    /// Builder: set stat riders.
    pub fn side_effects(mut self, caster: StatDelta, target: StatDelta) -> Self {
        self.side_effects = SideEffects { caster, target };
        self
    }

    /// Builder: narration for the heal branch of a conditional effect.
    pub fn heal_narration(mut self, template: &'static str) -> Self {
        self.heal_narration = Some(template);
        self
    }

    /// Resolve the effect for `caster` against `target`.
    ///
    /// Returns the outcome with damage already mitigated but NOT yet applied;
    /// the resolver applies it so clamping stays in one place.
    pub fn apply(
        &self,
        caster: &mut Fighter,
        target: &mut Fighter,
        config: &BattleConfig,
        rolls: &mut dyn RollSource,
    ) -> EffectOutcome {
        caster.apply_delta(self.side_effects.caster);
        target.apply_delta(self.side_effects.target);

        let mut outcome = self.kind.resolve(caster, target, rolls);
        if outcome.damage > 0 {
            outcome.damage = self.mitigation.apply(outcome.damage, target.defense, config);
        }
        outcome
    }

    /// Fill the narration template for a resolved outcome.
    pub fn narrate(&self, caster: &Fighter, target: &Fighter, outcome: &EffectOutcome) -> String {
        let template = match (outcome.healed_branch, self.heal_narration) {
            (true, Some(heal)) => heal,
            _ => self.narration,
        };
        template
            .replace("{attacker}", &caster.label)
            .replace("{defender}", &target.label)
            .replace("{value}", &outcome.value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mitigation_halves_defense() {
        let config = BattleConfig::default();
        assert_eq!(Mitigation::Standard.apply(30, 11, &config), 25);
        assert_eq!(Mitigation::Standard.apply(3, 40, &config), 1);
    }

    #[test]
    fn piercing_mitigation_uses_seventy_percent() {
        let config = BattleConfig::default();
        // floor(15 * 0.7) = 10
        assert_eq!(Mitigation::Piercing.apply(28, 15, &config), 18);
        assert_eq!(Mitigation::Piercing.apply(5, 15, &config), 1);
    }
}
