//! Repository contracts for rating persistence.

use super::error::Result;
use super::types::{BattleRecord, ProfileMap};

/// Storage for battle records and rating profiles.
///
/// Implementations need no internal write ordering: the rating worker is the
/// only writer and serializes every settlement.
pub trait RatingRepository: Send + Sync {
    /// Load every stored profile.
    fn load_profiles(&self) -> Result<ProfileMap>;

    /// Replace the stored profiles.
    fn save_profiles(&self, profiles: &ProfileMap) -> Result<()>;

    /// Load the record log, oldest first.
    fn load_records(&self) -> Result<Vec<BattleRecord>>;

    /// Append `record` and replace the stored profiles as one unit.
    ///
    /// On error neither the record nor the profiles may be observable by a
    /// later load.
    fn commit_battle(&self, record: &BattleRecord, profiles: &ProfileMap) -> Result<()>;
}
