use battle_core::{BattleMode, ParticipantId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::ArenaId;

/// Length of the random base36 tail of a record id.
pub const RECORD_ID_SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Immutable log entry written once per decisive battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// `battle_<unix-millis>_<9 base36 chars>`
    pub id: String,
    pub arena: ArenaId,
    pub winner: ParticipantId,
    pub winner_label: String,
    pub loser: ParticipantId,
    pub loser_label: String,
    pub turns: u32,
    pub winner_hp: u32,
    pub winner_max_hp: u32,
    pub mode: BattleMode,
    pub recorded_at: DateTime<Utc>,
}

impl BattleRecord {
    pub fn generate_id(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
        let suffix: String = (0..RECORD_ID_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        format!("battle_{}_{}", now.timestamp_millis(), suffix)
    }

    pub fn involves(&self, participant: &ParticipantId) -> bool {
        self.winner == *participant || self.loser == *participant
    }
}
