//! Flavor-line pools.
//!
//! Lines are plain text with `{attacker}`, `{defender}`, `{fighter}` and
//! `{winner}` placeholders. Markup is left to the presentation layer.

use super::RollSource;

pub const NORMAL_ATTACK: &[&str] = &[
    "{attacker} strikes {defender} with fury",
    "{attacker} unleashes a devastating blow upon {defender}",
    "{attacker} channels their inner alter ego against {defender}",
    "{attacker} delivers a blow to {defender}",
    "{attacker} attacks {defender} with determination",
    "{attacker} brings down their wrath on {defender}",
    "{attacker} manifests their true power against {defender}",
    "{attacker} launches a fierce assault on {defender}",
    "{attacker} quickly strikes {defender}",
];

pub const CRITICAL_HIT: &[&str] = &[
    "{attacker} lands a CRITICAL strike that shakes the heavens!",
    "{attacker} unleashes a soul-crushing CRITICAL blow!",
    "{attacker} empowers their alter ego for a DEVASTATING hit!",
    "{attacker} delivers a space-bending CRITICAL attack!",
    "{attacker} strikes with the fury of a thousand alters, CRITICAL!",
];

pub const DODGE: &[&str] = &[
    "{defender} elegantly evades {attacker}'s assault",
    "{defender} phases through {attacker}'s attack like a phantom",
    "{defender} reads {attacker}'s movements and dodges perfectly",
    "{defender} vanishes from sight, avoiding {attacker}'s strike",
    "{defender} sidesteps {attacker}'s attack",
    "{defender} anticipates {attacker}'s move and slips away",
];

pub const BLOCK: &[&str] = &[
    "{defender} raises their guard and blocks {attacker}'s attack",
    "{defender} deflects {attacker}'s strike with great skill",
    "{defender} resists {attacker}'s assault with a perfect block",
    "{defender} absorbs the impact with unwavering resolve",
    "{defender} withstands {attacker}'s attack",
];

pub const DEATH: &[&str] = &[
    "{fighter} collapses to the ground, defeated",
    "{fighter} falls with honor, their alter ego proud",
    "{fighter} succumbs to their wounds",
    "{fighter} takes their final breath, at peace",
    "{fighter} is vanquished, their spirit ascending",
    "{fighter} has been defeated, their legacy lives on",
    "{fighter} has fallen in battle",
    "{fighter}'s fate is sealed, their alter ego fades",
    "{fighter}'s journey ends here, their alter ego rests",
    "The comfort of death embraces {fighter}",
];

pub const VICTORY: &[&str] = &[
    "{winner} stands victorious over the battlefield!",
    "{winner} raises their arms in triumphant glory!",
    "{winner} has proven their supremacy in combat!",
    "{winner} emerges as the ultimate warrior!",
    "{winner} claims the title of champion!",
    "{winner} has prevailed!",
    "The heavens shall remember {winner}'s victory!",
];

/// Pick a line from `pool` and fill attacker/defender placeholders.
pub fn exchange_line(
    pool: &[&str],
    attacker: &str,
    defender: &str,
    rolls: &mut dyn RollSource,
) -> String {
    pick(pool, rolls)
        .replace("{attacker}", attacker)
        .replace("{defender}", defender)
}

pub fn death_line(fighter: &str, rolls: &mut dyn RollSource) -> String {
    pick(DEATH, rolls).replace("{fighter}", fighter)
}

pub fn victory_line(winner: &str, rolls: &mut dyn RollSource) -> String {
    pick(VICTORY, rolls).replace("{winner}", winner)
}

fn pick<'a>(pool: &[&'a str], rolls: &mut dyn RollSource) -> &'a str {
    pool.get(rolls.pick(pool.len())).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SequenceRolls;

    #[test]
    fn lines_fill_every_placeholder() {
        let mut rolls = SequenceRolls::new([0.0]);
        let line = exchange_line(NORMAL_ATTACK, "Ana", "Bo", &mut rolls);
        assert_eq!(line, "Ana strikes Bo with fury");

        let mut rolls = SequenceRolls::new([0.999]);
        assert_eq!(
            death_line("Bo", &mut rolls),
            "The comfort of death embraces Bo"
        );
        assert!(victory_line("Ana", &mut rolls).contains("Ana"));
    }

    #[test]
    fn no_pool_is_empty() {
        for pool in [NORMAL_ATTACK, CRITICAL_HIT, DODGE, BLOCK, DEATH, VICTORY] {
            assert!(!pool.is_empty());
            assert!(pool.iter().all(|line| !line.contains("{{")));
        }
    }
}
