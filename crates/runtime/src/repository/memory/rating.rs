//! In-memory RatingRepository implementation for tests and local runs.

use std::sync::RwLock;

use crate::repository::{BattleRecord, ProfileMap, RatingRepository, RepositoryError, Result};

/// Keeps profiles and records in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryRatingRepository {
    profiles: RwLock<ProfileMap>,
    records: RwLock<Vec<BattleRecord>>,
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing data.
    pub fn with_data(profiles: ProfileMap, records: Vec<BattleRecord>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            records: RwLock::new(records),
        }
    }
}

impl RatingRepository for InMemoryRatingRepository {
    fn load_profiles(&self) -> Result<ProfileMap> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(profiles.clone())
    }

    fn save_profiles(&self, profiles: &ProfileMap) -> Result<()> {
        let mut stored = self
            .profiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        stored.clone_from(profiles);
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.clone())
    }

    fn commit_battle(&self, record: &BattleRecord, profiles: &ProfileMap) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut stored = self
            .profiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.push(record.clone());
        stored.clone_from(profiles);
        Ok(())
    }
}
