//! Rating formulas.
//!
//! The weighted score discounts small samples: a 1-0 record scores about 11.3
//! while the score approaches the raw win rate (in percent) as battles pile
//! up. Leaderboards depend on the exact rounding, so keep it bit-compatible.

use core::cmp::Ordering;

use crate::config::BattleMode;

/// Exponential confidence decay per battle.
pub const CONFIDENCE_DECAY: f64 = 0.12;

/// Battles a participant needs on a track before appearing on its leaderboard.
pub const fn minimum_battles(mode: BattleMode) -> u32 {
    match mode {
        BattleMode::Casual => 3,
        BattleMode::Competitive => 5,
    }
}

/// Win rate rounded to a whole percent. Zero battles yields 0.
pub fn win_rate(wins: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total) * 100.0).round() as u32
}

/// `rate × (1 − e^(−0.12 × total)) × 100`, rounded to three decimals.
pub fn weighted_score(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = f64::from(wins) / f64::from(total);
    let confidence = 1.0 - (-CONFIDENCE_DECAY * f64::from(total)).exp();
    (rate * confidence * 100_000.0).round() / 1000.0
}

/// Counters for one mode track.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackRecord {
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
    /// Whole percent.
    pub win_rate: u32,
    pub weighted_score: f64,
}

impl TrackRecord {
    pub fn record_win(&mut self) {
        self.wins += 1;
        self.total += 1;
        self.refresh();
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
        self.total += 1;
        self.refresh();
    }

    /// Recompute the derived fields. Returns true if the weighted score moved.
    pub fn refresh(&mut self) -> bool {
        let score = weighted_score(self.wins, self.total);
        let changed = score.to_bits() != self.weighted_score.to_bits();
        self.win_rate = win_rate(self.wins, self.total);
        self.weighted_score = score;
        changed
    }

    pub fn qualifies(&self, mode: BattleMode) -> bool {
        self.total >= minimum_battles(mode)
    }

    /// Leaderboard order: weighted score descending, then wins descending.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .weighted_score
            .total_cmp(&self.weighted_score)
            .then_with(|| other.wins.cmp(&self.wins))
    }
}
