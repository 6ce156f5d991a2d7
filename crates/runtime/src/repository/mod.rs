//! Repository layer for rating data.
//!
//! Repositories hold the only state that outlives a session:
//! - Battle records (append-only log)
//! - Rating profiles (one per participant)
//!
//! Fighters and sessions are never persisted.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::FileRatingRepository;
pub use memory::InMemoryRatingRepository;
pub use traits::RatingRepository;
pub use types::{
    BattleRecord, LeaderboardEntry, ProfileMap, RECORD_ID_SUFFIX_LEN, RatingProfile, TrackStats,
};
