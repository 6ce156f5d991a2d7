//! Random source for live sessions.

use battle_core::RollSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// [`RollSource`] backed by a [`StdRng`].
///
/// Seeded sessions replay identically, which the tests and the CLI's
/// `--seed` flag rely on.
#[derive(Debug, Clone)]
pub struct RngRolls {
    rng: StdRng,
}

impl RngRolls {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl RollSource for RngRolls {
    fn roll(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}
