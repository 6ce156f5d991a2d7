//! Effect kinds and their resolution rules.

use crate::combat::RollSource;
use crate::fighter::{Fighter, StatDelta};

/// Number of hits dealt by a multi-hit effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitCount {
    Fixed(u32),
    /// Uniform in `1..=max`, drawn from the session's roll source.
    Random { max: u32 },
}

/// The resolution rule of an ability.
///
/// Damage multipliers scale the caster's attack at the moment of resolution,
/// after any stat riders of the owning [`super::AbilityEffect`] were applied.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectKind {
    /// `floor(attack × multiplier)` damage.
    DirectDamage { multiplier: f64 },

    /// Stat change on the caster, no damage.
    SelfBuff { delta: StatDelta },

    /// Restore `floor(max_hp × fraction)` and optionally buff the caster.
    SelfHeal { fraction: f64, delta: StatDelta },

    /// Stat change on the target, no damage.
    DebuffEnemy { delta: StatDelta },

    /// Below `threshold × max_hp` heal for `heal_fraction × max_hp`,
    /// otherwise strike for `attack × multiplier`.
    ConditionalHealOrDamage {
        threshold: f64,
        heal_fraction: f64,
        multiplier: f64,
    },

    /// `floor(attack × per_hit) × hits` damage.
    MultiHit { per_hit: f64, hits: HitCount },

    /// `floor(attack + missing_hp × missing_hp_ratio)` damage.
    Execute { missing_hp_ratio: f64 },
}

/// What an effect did, before damage is applied to the target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub damage: u32,
    /// Nominal heal amount (before clamping to max HP).
    pub healed: u32,
    /// Number substituted for `{value}` in narration (heal amount or hit count).
    pub value: u32,
    /// True when a conditional effect took its heal branch.
    pub healed_branch: bool,
}

impl EffectKind {
    /// True when the kind can produce damage.
    pub fn is_offensive(&self) -> bool {
        !matches!(
            self,
            Self::SelfBuff { .. } | Self::SelfHeal { .. } | Self::DebuffEnemy { .. }
        )
    }

    pub(crate) fn resolve(
        &self,
        caster: &mut Fighter,
        target: &mut Fighter,
        rolls: &mut dyn RollSource,
    ) -> EffectOutcome {
        match *self {
            Self::DirectDamage { multiplier } => EffectOutcome {
                damage: scaled(caster.attack, multiplier),
                ..EffectOutcome::default()
            },
            Self::SelfBuff { delta } => {
                caster.apply_delta(delta);
                EffectOutcome::default()
            }
            Self::SelfHeal { fraction, delta } => {
                let amount = scaled(caster.max_hp, fraction);
                caster.heal(amount);
                caster.apply_delta(delta);
                EffectOutcome {
                    healed: amount,
                    value: amount,
                    ..EffectOutcome::default()
                }
            }
            Self::DebuffEnemy { delta } => {
                target.apply_delta(delta);
                EffectOutcome::default()
            }
            Self::ConditionalHealOrDamage {
                threshold,
                heal_fraction,
                multiplier,
            } => {
                if f64::from(caster.hp) < f64::from(caster.max_hp) * threshold {
                    let amount = scaled(caster.max_hp, heal_fraction);
                    caster.heal(amount);
                    EffectOutcome {
                        healed: amount,
                        value: amount,
                        healed_branch: true,
                        ..EffectOutcome::default()
                    }
                } else {
                    EffectOutcome {
                        damage: scaled(caster.attack, multiplier),
                        ..EffectOutcome::default()
                    }
                }
            }
            Self::MultiHit { per_hit, hits } => {
                let hits = match hits {
                    HitCount::Fixed(count) => count,
                    HitCount::Random { max } => rolls.pick(max.max(1) as usize) as u32 + 1,
                };
                EffectOutcome {
                    damage: scaled(caster.attack, per_hit) * hits,
                    value: hits,
                    ..EffectOutcome::default()
                }
            }
            Self::Execute { missing_hp_ratio } => {
                let bonus = f64::from(caster.missing_hp()) * missing_hp_ratio;
                EffectOutcome {
                    damage: (f64::from(caster.attack) + bonus).floor() as u32,
                    ..EffectOutcome::default()
                }
            }
        }
    }
}

fn scaled(base: u32, factor: f64) -> u32 {
    (f64::from(base) * factor).floor() as u32
}
