use std::collections::BTreeMap;

use battle_core::{BattleMode, ParticipantId, TrackRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All stored profiles keyed by participant.
pub type ProfileMap = BTreeMap<ParticipantId, RatingProfile>;

/// One mode track of a profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStats {
    #[serde(flatten)]
    pub record: TrackRecord,
    pub last_battle_at: Option<DateTime<Utc>>,
}

/// Per-participant rating state, created lazily on the first recorded battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingProfile {
    pub participant: ParticipantId,
    /// Display label as last seen.
    pub label: String,
    pub casual: TrackStats,
    pub competitive: TrackStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingProfile {
    pub fn new(participant: ParticipantId, label: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            participant,
            label: label.into(),
            casual: TrackStats::default(),
            competitive: TrackStats::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn track(&self, mode: BattleMode) -> &TrackStats {
        match mode {
            BattleMode::Casual => &self.casual,
            BattleMode::Competitive => &self.competitive,
        }
    }

    pub fn track_mut(&mut self, mode: BattleMode) -> &mut TrackStats {
        match mode {
            BattleMode::Casual => &mut self.casual,
            BattleMode::Competitive => &mut self.competitive,
        }
    }

    /// Count one result on `mode`'s track.
    pub fn record_result(&mut self, mode: BattleMode, won: bool, label: &str, now: DateTime<Utc>) {
        let track = self.track_mut(mode);
        if won {
            track.record.record_win();
        } else {
            track.record.record_loss();
        }
        track.last_battle_at = Some(now);
        self.label = label.to_owned();
        self.updated_at = now;
    }

    /// Recompute both tracks' derived fields. Returns true if any weighted score moved.
    pub fn refresh_scores(&mut self) -> bool {
        let casual = self.casual.record.refresh();
        let competitive = self.competitive.record.refresh();
        casual || competitive
    }
}

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub participant: ParticipantId,
    pub label: String,
    pub stats: TrackRecord,
}
