//! CLI configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_runtime::RuntimeConfig;

/// Terminal client configuration.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub start_delay: Duration,
    pub turn_delay: Duration,
    pub consent_deadline: Duration,
    pub rng_seed: Option<u64>,
}

impl CliConfig {
    /// Construct CLI configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_DATA_DIR` - Directory for records and profiles (default: platform data dir)
    /// - `BATTLE_TURN_DELAY_MS` - Pause between turns (default: 2000)
    /// - `BATTLE_START_DELAY_MS` - Pause before the first turn (default: 3000)
    /// - `BATTLE_CONSENT_SECS` - Consent deadline for ranked battles (default: 15)
    /// - `BATTLE_RNG_SEED` - Seed for reproducible battles (default: unset)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("BATTLE_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(ms) = read_env::<u64>("BATTLE_TURN_DELAY_MS") {
            config.turn_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BATTLE_START_DELAY_MS") {
            config.start_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env::<u64>("BATTLE_CONSENT_SECS") {
            config.consent_deadline = Duration::from_secs(secs.max(1));
        }
        config.rng_seed = read_env::<u64>("BATTLE_RNG_SEED");

        config
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            start_delay: self.start_delay,
            turn_delay: self.turn_delay,
            consent_deadline: self.consent_deadline,
            rng_seed: self.rng_seed,
            data_dir: Some(self.data_dir.clone()),
            ..RuntimeConfig::default()
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            data_dir: default_data_dir(),
            start_delay: runtime.start_delay,
            turn_delay: runtime.turn_delay,
            consent_deadline: runtime.consent_deadline,
            rng_seed: None,
        }
    }
}

/// Platform data directory, e.g. `~/.local/share/battle` on Linux.
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "battle")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./battle_data"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
