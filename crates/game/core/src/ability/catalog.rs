use crate::fighter::StatDelta;

use super::{AbilityEffect, AbilityId, EffectKind, HitCount, Mitigation};

/// Ordered, immutable registry of ability effects.
///
/// Entry order matters: fighter generation draws loadouts by catalog index,
/// so reordering entries changes every participant's abilities.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityCatalog {
    entries: Vec<AbilityEffect>,
}

impl AbilityCatalog {
    /// Build a catalog from arbitrary entries (tests, balance experiments).
    pub fn from_entries(entries: Vec<AbilityEffect>) -> Self {
        Self { entries }
    }

    /// The live eighteen-entry catalog.
    pub fn standard() -> Self {
        use EffectKind::*;

        let entries = vec![
            AbilityEffect::new(
                "Alter Ego Burst",
                DirectDamage { multiplier: 1.5 },
                "{attacker} channels their alter ego into a devastating burst!",
            ),
            AbilityEffect::new(
                "Divine Shield",
                SelfBuff {
                    delta: StatDelta::defense(3),
                },
                "{attacker} raises a divine shield, hardening their defense! (+3 DEF)",
            ),
            AbilityEffect::new(
                "Shadow Clone",
                DirectDamage { multiplier: 1.2 },
                "{attacker} splits into shadow clones and strikes from every angle! (+1 ATK)",
            )
            .side_effects(StatDelta::attack(1), StatDelta::NONE),
            AbilityEffect::new(
                "Healing Light",
                SelfHeal {
                    fraction: 0.3,
                    delta: StatDelta::NONE,
                },
                "{attacker} bathes in healing light, restoring {value} HP!",
            ),
            AbilityEffect::new(
                "Berserker Rage",
                SelfBuff {
                    delta: StatDelta::new(5, -2, 0),
                },
                "{attacker} flies into a berserker rage! (+5 ATK, -2 DEF)",
            ),
            AbilityEffect::new(
                "Time Slow",
                SelfBuff {
                    delta: StatDelta::speed(5),
                },
                "{attacker} bends time around them! (+5 SPD)",
            ),
            AbilityEffect::new(
                "Soul Strike",
                DirectDamage { multiplier: 1.3 },
                "{attacker} strikes straight at {defender}'s soul, stealing their momentum! (+1 SPD, -1 SPD to enemy)",
            )
            .side_effects(StatDelta::speed(1), StatDelta::speed(-1))
            .mitigation(Mitigation::Piercing),
            AbilityEffect::new(
                "Phoenix Rising",
                ConditionalHealOrDamage {
                    threshold: 0.3,
                    heal_fraction: 0.4,
                    multiplier: 1.2,
                },
                "{attacker} strikes with phoenix fire!",
            )
            .heal_narration("{attacker} rises from the ashes, healing {value} HP!"),
            AbilityEffect::new(
                "Relic of Exo",
                DirectDamage { multiplier: 1.4 },
                "{attacker} unleashes the Relic of Exo, cutting through defenses!",
            )
            .mitigation(Mitigation::Piercing),
            AbilityEffect::new(
                "Ego's Blessing",
                SelfBuff {
                    delta: StatDelta::new(2, 2, 2),
                },
                "{attacker} receives Ego's blessing! (+2 to all stats)",
            ),
            AbilityEffect::new(
                "Cleansing",
                SelfHeal {
                    fraction: 0.15,
                    delta: StatDelta::speed(5),
                },
                "{attacker} cleanses body and soul, healing {value} HP! (+5 SPD)",
            ),
            AbilityEffect::new(
                "Raise the Dead",
                ConditionalHealOrDamage {
                    threshold: 0.25,
                    heal_fraction: 0.5,
                    multiplier: 1.1,
                },
                "{attacker} summons the spirits of the fallen to strike!",
            )
            .heal_narration("{attacker} calls upon the dead, cheating death with {value} HP!"),
            AbilityEffect::new(
                "Warrior's Call",
                SelfBuff {
                    delta: StatDelta::attack(4),
                },
                "{attacker} lets out a warrior's cry! (+4 ATK)",
            ),
            AbilityEffect::new(
                "Drop the Beat",
                DebuffEnemy {
                    delta: StatDelta::speed(-3),
                },
                "{attacker} drops the beat and throws off {defender}'s rhythm! (-3 SPD to enemy)",
            ),
            AbilityEffect::new(
                "Call to Arms",
                MultiHit {
                    per_hit: 0.6,
                    hits: HitCount::Fixed(3),
                },
                "{attacker} sounds the call to arms and a platoon fires {value} volleys!",
            ),
            AbilityEffect::new(
                "Airstrike",
                MultiHit {
                    per_hit: 1.7 / 5.0,
                    hits: HitCount::Random { max: 5 },
                },
                "{attacker} calls in an airstrike, {value} bomber(s) raining destruction!",
            ),
            AbilityEffect::new(
                "Divine Intervention",
                SelfHeal {
                    fraction: 0.25,
                    delta: StatDelta::defense(5),
                },
                "{attacker} is touched by divine intervention, healing {value} HP! (+5 DEF)",
            ),
            AbilityEffect::new(
                "Great Will",
                Execute {
                    missing_hp_ratio: 0.5,
                },
                "{attacker} turns their wounds into raw power!",
            ),
        ];

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of every entry, in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = AbilityId> + '_ {
        (0..self.entries.len()).map(|index| AbilityId(index as u16))
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityEffect> {
        self.entries.get(usize::from(id.0))
    }

    /// Look an entry up by display name.
    pub fn find(&self, name: &str) -> Option<(AbilityId, &AbilityEffect)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name == name)
            .map(|(index, entry)| (AbilityId(index as u16), entry))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AbilityId, &AbilityEffect)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (AbilityId(index as u16), entry))
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
