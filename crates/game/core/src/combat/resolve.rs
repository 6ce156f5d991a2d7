//! Single-turn resolution.

use crate::ability::AbilityCatalog;
use crate::config::BattleConfig;
use crate::error::CombatError;
use crate::fighter::Fighter;

use super::narration::{self, BLOCK, CRITICAL_HIT, DODGE, NORMAL_ATTACK};
use super::{DefenseOutcome, RollSource, TurnAction};

/// What one turn did, without session bookkeeping (turn number, health
/// snapshots in input order).
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub action: TurnAction,
    pub ability: Option<&'static str>,
    /// Damage dealt after mitigation.
    pub damage: u32,
    /// Health actually restored to the attacker.
    pub healed: u32,
    pub critical: bool,
    pub narration: String,
}

/// Resolve one turn of `attacker` against `defender`, mutating both in place.
///
/// # Roll order
///
/// 1. ability roll (`< ability_chance` uses an ability)
/// 2. ability path: loadout pick, then whatever the effect draws
/// 3. basic path: critical roll, defense roll, narration pick
///
/// # Errors
///
/// [`CombatError::UnknownAbility`] when the picked loadout slot is missing
/// from `catalog`. Neither fighter is touched in that case.
pub fn resolve_turn(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    catalog: &AbilityCatalog,
    config: &BattleConfig,
    rolls: &mut dyn RollSource,
) -> Result<TurnOutcome, CombatError> {
    let mut outcome = if rolls.roll() < config.ability_chance {
        use_ability(attacker, defender, catalog, config, rolls)?
    } else {
        basic_attack(attacker, defender, config, rolls)
    };

    defender.take_damage(outcome.damage);
    if outcome.damage > 0 {
        outcome.narration.push_str(&format!(" ({} dmg)", outcome.damage));
    }
    Ok(outcome)
}

fn use_ability(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    catalog: &AbilityCatalog,
    config: &BattleConfig,
    rolls: &mut dyn RollSource,
) -> Result<TurnOutcome, CombatError> {
    let id = attacker.abilities[rolls.pick(BattleConfig::LOADOUT_SIZE)];
    let effect = catalog.get(id).ok_or(CombatError::UnknownAbility { id })?;

    let before = attacker.hp;
    let result = effect.apply(attacker, defender, config, rolls);

    Ok(TurnOutcome {
        action: TurnAction::Ability,
        ability: Some(effect.name),
        damage: result.damage,
        healed: attacker.hp.saturating_sub(before),
        critical: false,
        narration: effect.narrate(attacker, defender, &result),
    })
}

fn basic_attack(
    attacker: &Fighter,
    defender: &Fighter,
    config: &BattleConfig,
    rolls: &mut dyn RollSource,
) -> TurnOutcome {
    let critical = rolls.roll() < attacker.crit_chance;
    let raw = if critical {
        (f64::from(attacker.attack) * config.crit_multiplier).floor() as u32
    } else {
        attacker.attack
    };

    let defense = DefenseOutcome::classify(rolls.roll(), config);
    let damage = defense.mitigate(raw, defender.defense);

    let (action, pool) = match defense {
        DefenseOutcome::Dodge => (TurnAction::Dodge, DODGE),
        DefenseOutcome::Block => (TurnAction::Block, BLOCK),
        DefenseOutcome::Hit if critical => (TurnAction::Attack, CRITICAL_HIT),
        DefenseOutcome::Hit => (TurnAction::Attack, NORMAL_ATTACK),
    };

    TurnOutcome {
        action,
        ability: None,
        damage,
        healed: 0,
        critical: critical && defense != DefenseOutcome::Dodge,
        narration: narration::exchange_line(pool, &attacker.label, &defender.label, rolls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityId;
    use crate::combat::SequenceRolls;
    use crate::fighter::ParticipantId;

    fn fighter(label: &str, abilities: [AbilityId; 2]) -> Fighter {
        Fighter {
            id: ParticipantId::new(label),
            label: label.into(),
            hp: 100,
            max_hp: 100,
            attack: 20,
            defense: 10,
            speed: 15,
            crit_chance: 0.2,
            abilities,
        }
    }

    fn resolve(rolls: &[f64], attacker: &mut Fighter, defender: &mut Fighter) -> TurnOutcome {
        let catalog = AbilityCatalog::standard();
        let config = BattleConfig::default();
        let mut rolls = SequenceRolls::new(rolls.iter().copied());
        resolve_turn(attacker, defender, &catalog, &config, &mut rolls).expect("turn resolves")
    }

    #[test]
    fn plain_hit_halves_defense() {
        let mut a = fighter("Ana", [AbilityId(0), AbilityId(1)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        // no ability, no crit, hit band, first line
        let outcome = resolve(&[0.9, 0.9, 0.9, 0.0], &mut a, &mut b);
        assert_eq!(outcome.action, TurnAction::Attack);
        assert!(!outcome.critical);
        assert_eq!(outcome.damage, 15);
        assert_eq!(b.hp, 85);
        assert_eq!(outcome.narration, "Ana strikes Bo with fury (15 dmg)");
    }

    #[test]
    fn critical_hit_multiplies_before_mitigation() {
        let mut a = fighter("Ana", [AbilityId(0), AbilityId(1)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let outcome = resolve(&[0.9, 0.0, 0.9, 0.0], &mut a, &mut b);
        assert!(outcome.critical);
        // floor(20 × 1.8) = 36, minus 5
        assert_eq!(outcome.damage, 31);
    }

    #[test]
    fn dodge_negates_everything() {
        let mut a = fighter("Ana", [AbilityId(0), AbilityId(1)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let outcome = resolve(&[0.9, 0.0, 0.05, 0.0], &mut a, &mut b);
        assert_eq!(outcome.action, TurnAction::Dodge);
        assert_eq!(outcome.damage, 0);
        assert!(!outcome.critical);
        assert_eq!(b.hp, 100);
        assert!(!outcome.narration.contains("dmg"));
    }

    #[test]
    fn block_subtracts_full_defense() {
        let mut a = fighter("Ana", [AbilityId(0), AbilityId(1)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let outcome = resolve(&[0.9, 0.9, 0.2, 0.0], &mut a, &mut b);
        assert_eq!(outcome.action, TurnAction::Block);
        assert_eq!(outcome.damage, 10);
    }

    #[test]
    fn ability_branch_uses_picked_slot() {
        // slot 1 = Relic of Exo (index 8)
        let mut a = fighter("Ana", [AbilityId(1), AbilityId(8)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let outcome = resolve(&[0.1, 0.9], &mut a, &mut b);
        assert_eq!(outcome.action, TurnAction::Ability);
        assert_eq!(outcome.ability, Some("Relic of Exo"));
        // floor(20 × 1.4) = 28, minus floor(10 × 0.7)
        assert_eq!(outcome.damage, 21);
        assert_eq!(b.hp, 79);
    }

    #[test]
    fn heal_reports_restored_health() {
        // slot 0 = Healing Light (index 3)
        let mut a = fighter("Ana", [AbilityId(3), AbilityId(8)]);
        a.hp = 90;
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let outcome = resolve(&[0.1, 0.0], &mut a, &mut b);
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.healed, 10);
        assert_eq!(a.hp, 100);
        assert_eq!(b.hp, 100);
    }

    #[test]
    fn unknown_ability_leaves_fighters_untouched() {
        let mut a = fighter("Ana", [AbilityId(200), AbilityId(201)]);
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        let (a0, b0) = (a.clone(), b.clone());
        let mut rolls = SequenceRolls::new([0.1, 0.0]);
        let err = resolve_turn(
            &mut a,
            &mut b,
            &AbilityCatalog::standard(),
            &BattleConfig::default(),
            &mut rolls,
        )
        .unwrap_err();
        assert_eq!(err, CombatError::UnknownAbility { id: AbilityId(200) });
        assert_eq!((a, b), (a0, b0));
    }

    #[test]
    fn damage_never_drives_health_negative() {
        let mut a = fighter("Ana", [AbilityId(0), AbilityId(1)]);
        a.attack = 500;
        let mut b = fighter("Bo", [AbilityId(0), AbilityId(1)]);
        b.hp = 3;
        let outcome = resolve(&[0.9, 0.9, 0.9, 0.0], &mut a, &mut b);
        assert!(outcome.damage > 3);
        assert_eq!(b.hp, 0);
    }
}
