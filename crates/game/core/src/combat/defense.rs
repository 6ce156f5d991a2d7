use crate::config::BattleConfig;

/// How the defender answers a basic attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefenseOutcome {
    /// Total negation.
    Dodge,
    /// Damage reduced by the full defense value.
    Block,
    /// Damage reduced by half the defense value.
    Hit,
}

impl DefenseOutcome {
    /// Map a defense roll onto the dodge / block / hit bands.
    pub fn classify(roll: f64, config: &BattleConfig) -> Self {
        if roll < config.dodge_threshold {
            Self::Dodge
        } else if roll < config.block_threshold {
            Self::Block
        } else {
            Self::Hit
        }
    }

    /// Damage that gets through. Anything but a dodge deals at least 1.
    pub fn mitigate(self, damage: u32, defense: u32) -> u32 {
        match self {
            Self::Dodge => 0,
            Self::Block => damage.saturating_sub(defense).max(1),
            Self::Hit => damage.saturating_sub(defense / 2).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        let config = BattleConfig::default();
        assert_eq!(DefenseOutcome::classify(0.0, &config), DefenseOutcome::Dodge);
        assert_eq!(DefenseOutcome::classify(0.149, &config), DefenseOutcome::Dodge);
        assert_eq!(DefenseOutcome::classify(0.15, &config), DefenseOutcome::Block);
        assert_eq!(DefenseOutcome::classify(0.299, &config), DefenseOutcome::Block);
        assert_eq!(DefenseOutcome::classify(0.30, &config), DefenseOutcome::Hit);
    }

    #[test]
    fn mitigation_never_goes_negative() {
        assert_eq!(DefenseOutcome::Dodge.mitigate(40, 5), 0);
        assert_eq!(DefenseOutcome::Block.mitigate(10, 15), 1);
        assert_eq!(DefenseOutcome::Block.mitigate(20, 15), 5);
        assert_eq!(DefenseOutcome::Hit.mitigate(20, 15), 13);
        assert_eq!(DefenseOutcome::Hit.mitigate(3, 15), 1);
    }
}
