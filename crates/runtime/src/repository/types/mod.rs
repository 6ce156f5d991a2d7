//! Shared types for repository layer.

mod profile;
mod record;

pub use profile::{LeaderboardEntry, ProfileMap, RatingProfile, TrackStats};
pub use record::{BattleRecord, RECORD_ID_SUFFIX_LEN};
