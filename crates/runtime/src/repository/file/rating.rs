//! File-based RatingRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{BattleRecord, ProfileMap, RatingRepository, RepositoryError, Result};

/// JSON documents under one directory.
///
/// # File Format
///
/// - `battle_stats.json`: object keyed by participant id
/// - `battle_records.json`: array of records, oldest first
///
/// Every write goes to a `.tmp` sibling first and is renamed into place, so a
/// crash never leaves a half-written document behind.
pub struct FileRatingRepository {
    base_dir: PathBuf,
}

impl FileRatingRepository {
    pub const STATS_FILE: &'static str = "battle_stats.json";
    pub const RECORDS_FILE: &'static str = "battle_records.json";

    /// Create the repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.base_dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        if json.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&json).map_err(|e| RepositoryError::CorruptedData {
            file: name.to_owned(),
            reason: e.to_string(),
        })
    }

    fn write_atomic<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let staged = self.stage(name, value)?;
        self.publish(&staged, name)
    }

    /// Serialize `value` into the `.tmp` sibling of `name`.
    fn stage<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let temp_path = self.base_dir.join(name).with_extension("json.tmp");

        let json =
            serde_json::to_string_pretty(value).map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;
        Ok(temp_path)
    }

    fn publish(&self, staged: &Path, name: &str) -> Result<()> {
        let path = self.base_dir.join(name);

        // Atomic rename
        if let Err(e) = fs::rename(staged, &path) {
            let _ = fs::remove_file(staged);
            return Err(RepositoryError::Io(e));
        }

        tracing::debug!("Saved {}", path.display());
        Ok(())
    }
}

impl RatingRepository for FileRatingRepository {
    fn load_profiles(&self) -> Result<ProfileMap> {
        let profiles: ProfileMap = self.read_or_default(Self::STATS_FILE)?;
        tracing::info!("Loaded {} rating profiles", profiles.len());
        Ok(profiles)
    }

    fn save_profiles(&self, profiles: &ProfileMap) -> Result<()> {
        self.write_atomic(Self::STATS_FILE, profiles)
    }

    fn load_records(&self) -> Result<Vec<BattleRecord>> {
        self.read_or_default(Self::RECORDS_FILE)
    }

    fn commit_battle(&self, record: &BattleRecord, profiles: &ProfileMap) -> Result<()> {
        let mut records: Vec<BattleRecord> = self.load_records()?;
        records.push(record.clone());

        // Both documents are staged before either is renamed into place.
        let staged_records = self.stage(Self::RECORDS_FILE, &records)?;
        let staged_profiles = match self.stage(Self::STATS_FILE, profiles) {
            Ok(path) => path,
            Err(e) => {
                let _ = fs::remove_file(&staged_records);
                return Err(e);
            }
        };

        if let Err(e) = self.publish(&staged_records, Self::RECORDS_FILE) {
            let _ = fs::remove_file(&staged_profiles);
            return Err(e);
        }

        if let Err(e) = self.publish(&staged_profiles, Self::STATS_FILE) {
            records.pop();
            if let Err(rollback) = self.write_atomic(Self::RECORDS_FILE, &records) {
                tracing::error!(
                    record = %record.id,
                    "Failed to roll back battle record: {}",
                    rollback
                );
            }
            return Err(e);
        }
        Ok(())
    }
}
