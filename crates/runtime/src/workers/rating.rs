//! Rating worker: the single writer of battle records and rating profiles.
//!
//! Settlements from concurrent sessions queue on one command channel and are
//! applied one at a time, so no two read-modify-write cycles of a profile can
//! interleave. Queries are answered from the worker's in-memory copy.

use std::sync::Arc;

use battle_core::{BattleMode, Participant, ParticipantId, TrackRecord};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::api::{ArenaId, Result, RuntimeError};
use crate::repository::{
    BattleRecord, LeaderboardEntry, ProfileMap, RatingProfile, RatingRepository,
    RepositoryError, Result as RepoResult,
};

/// Input of [`RatingHandle::record_battle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRequest {
    pub arena: ArenaId,
    pub winner: Participant,
    pub loser: Participant,
    pub turns: u32,
    pub winner_hp: u32,
    pub winner_max_hp: u32,
    pub mode: BattleMode,
}

pub(crate) enum Command {
    Record {
        request: RecordRequest,
        reply: oneshot::Sender<RepoResult<BattleRecord>>,
    },
    Profile {
        participant: ParticipantId,
        reply: oneshot::Sender<Option<RatingProfile>>,
    },
    Leaderboard {
        mode: BattleMode,
        limit: usize,
        reply: oneshot::Sender<Vec<LeaderboardEntry>>,
    },
    History {
        participant: ParticipantId,
        limit: usize,
        mode: Option<BattleMode>,
        reply: oneshot::Sender<Vec<BattleRecord>>,
    },
    Recompute {
        reply: oneshot::Sender<RepoResult<usize>>,
    },
    Shutdown,
}

/// Background task owning the rating state.
pub(crate) struct RatingWorker {
    repository: Arc<dyn RatingRepository>,
    profiles: ProfileMap,
    records: Vec<BattleRecord>,
    command_rx: mpsc::Receiver<Command>,
    rng: StdRng,
}

impl RatingWorker {
    /// Load the current state from `repository`.
    pub(crate) fn new(
        repository: Arc<dyn RatingRepository>,
        command_rx: mpsc::Receiver<Command>,
    ) -> RepoResult<Self> {
        let profiles = repository.load_profiles()?;
        let records = repository.load_records()?;
        Ok(Self {
            repository,
            profiles,
            records,
            command_rx,
            rng: StdRng::from_entropy(),
        })
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        info!(
            profiles = self.profiles.len(),
            records = self.records.len(),
            "RatingWorker started"
        );

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                Command::Record { request, reply } => {
                    let result = self.record(request, Utc::now()).await;
                    if let Err(e) = &result {
                        error!("Failed to persist battle record: {}", e);
                    }
                    let _ = reply.send(result);
                }
                Command::Profile { participant, reply } => {
                    let _ = reply.send(self.profiles.get(&participant).cloned());
                }
                Command::Leaderboard { mode, limit, reply } => {
                    let _ = reply.send(leaderboard(&self.profiles, mode, limit));
                }
                Command::History {
                    participant,
                    limit,
                    mode,
                    reply,
                } => {
                    let _ = reply.send(self.history(&participant, limit, mode));
                }
                Command::Recompute { reply } => {
                    let _ = reply.send(self.recompute().await);
                }
                Command::Shutdown => {
                    info!("Shutdown command received");
                    break;
                }
            }
        }

        info!("RatingWorker stopped");
    }

    async fn record(
        &mut self,
        request: RecordRequest,
        now: DateTime<Utc>,
    ) -> RepoResult<BattleRecord> {
        let record = BattleRecord {
            id: BattleRecord::generate_id(now, &mut self.rng),
            arena: request.arena,
            winner: request.winner.id.clone(),
            winner_label: request.winner.label.clone(),
            loser: request.loser.id.clone(),
            loser_label: request.loser.label.clone(),
            turns: request.turns,
            winner_hp: request.winner_hp,
            winner_max_hp: request.winner_max_hp,
            mode: request.mode,
            recorded_at: now,
        };

        // Stage on a copy; the cache only moves once the commit succeeds.
        let mut profiles = self.profiles.clone();
        for (participant, won) in [(&request.winner, true), (&request.loser, false)] {
            profiles
                .entry(participant.id.clone())
                .or_insert_with(|| RatingProfile::new(participant.id.clone(), &participant.label, now))
                .record_result(request.mode, won, &participant.label, now);
        }

        let (record, profiles) = blocking(Arc::clone(&self.repository), move |repository| {
            repository.commit_battle(&record, &profiles)?;
            Ok((record, profiles))
        })
        .await?;
        self.records.push(record.clone());
        self.profiles = profiles;

        debug!(
            record = %record.id,
            winner = %record.winner,
            loser = %record.loser,
            mode = %record.mode,
            "battle recorded"
        );
        Ok(record)
    }

    fn history(
        &self,
        participant: &ParticipantId,
        limit: usize,
        mode: Option<BattleMode>,
    ) -> Vec<BattleRecord> {
        self.records
            .iter()
            .rev()
            .filter(|record| record.involves(participant))
            .filter(|record| mode.is_none_or(|mode| record.mode == mode))
            .take(limit)
            .cloned()
            .collect()
    }

    async fn recompute(&mut self) -> RepoResult<usize> {
        let mut profiles = self.profiles.clone();
        let changed = profiles
            .values_mut()
            .map(RatingProfile::refresh_scores)
            .filter(|changed| *changed)
            .count();

        if changed > 0 {
            self.profiles = blocking(Arc::clone(&self.repository), move |repository| {
                repository.save_profiles(&profiles)?;
                Ok(profiles)
            })
            .await?;
        }
        info!(changed, total = self.profiles.len(), "weighted scores recomputed");
        Ok(changed)
    }
}

/// Run a repository call on the blocking pool.
async fn blocking<T, F>(repository: Arc<dyn RatingRepository>, op: F) -> RepoResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn RatingRepository) -> RepoResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(repository.as_ref()))
        .await
        .map_err(|e| RepositoryError::TaskFailed(e.to_string()))?
}

/// Rank qualifying profiles on `mode`'s track.
pub(crate) fn leaderboard(
    profiles: &ProfileMap,
    mode: BattleMode,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&RatingProfile, &TrackRecord)> = profiles
        .values()
        .map(|profile| (profile, &profile.track(mode).record))
        .filter(|(_, track)| track.qualifies(mode))
        .collect();
    rows.sort_by(|(_, a), (_, b)| a.ranking_cmp(b));

    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (profile, track))| LeaderboardEntry {
            rank: index + 1,
            participant: profile.participant.clone(),
            label: profile.label.clone(),
            stats: track.clone(),
        })
        .collect()
}

/// Cloneable client of the rating worker.
#[derive(Clone)]
pub struct RatingHandle {
    command_tx: mpsc::Sender<Command>,
}

impl RatingHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::RatingWorkerClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Append a record and update both participants' profiles.
    pub async fn record_battle(&self, request: RecordRequest) -> Result<BattleRecord> {
        Ok(self
            .request(|reply| Command::Record { request, reply })
            .await??)
    }

    pub async fn profile(&self, participant: &ParticipantId) -> Result<Option<RatingProfile>> {
        let participant = participant.clone();
        self.request(|reply| Command::Profile { participant, reply })
            .await
    }

    /// Top `limit` participants with enough battles on `mode`'s track.
    pub async fn leaderboard(&self, mode: BattleMode, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.request(|reply| Command::Leaderboard { mode, limit, reply })
            .await
    }

    /// Records involving `participant`, newest first.
    pub async fn history(
        &self,
        participant: &ParticipantId,
        limit: usize,
        mode: Option<BattleMode>,
    ) -> Result<Vec<BattleRecord>> {
        let participant = participant.clone();
        self.request(|reply| Command::History {
            participant,
            limit,
            mode,
            reply,
        })
        .await
    }

    /// Recompute every stored weighted score. Returns how many profiles changed.
    pub async fn recompute_weighted_scores(&self) -> Result<usize> {
        Ok(self.request(|reply| Command::Recompute { reply }).await??)
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::RatingWorkerClosed)
    }
}
