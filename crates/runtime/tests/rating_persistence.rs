use std::sync::Arc;

use battle_core::{BattleMode, Participant, ParticipantId, TrackRecord};
use battle_runtime::repository::{BattleRecord, ProfileMap, Result as RepoResult};
use battle_runtime::{
    ArenaId, BattleRuntime, InMemoryRatingRepository, RatingHandle, RatingRepository,
    RecordRequest, RepositoryError, RuntimeConfig, RuntimeError, SessionRequest,
};

fn participant(id: &str) -> Participant {
    Participant::new(id, format!("Fighter {id}"))
}

fn request(winner: &str, loser: &str, mode: BattleMode) -> RecordRequest {
    RecordRequest {
        arena: ArenaId::new("guild"),
        winner: participant(winner),
        loser: participant(loser),
        turns: 12,
        winner_hp: 40,
        winner_max_hp: 110,
        mode,
    }
}

async fn in_memory() -> BattleRuntime {
    BattleRuntime::builder()
        .config(RuntimeConfig::instant())
        .build()
        .await
        .unwrap()
}

async fn tracks(rating: &RatingHandle, id: &str) -> (TrackRecord, TrackRecord) {
    let profile = rating
        .profile(&ParticipantId::new(id))
        .await
        .unwrap()
        .expect("profile exists");
    (profile.casual.record, profile.competitive.record)
}

#[tokio::test]
async fn leaderboard_ranks_qualified_participants_by_weighted_score() {
    let runtime = in_memory().await;
    let rating = runtime.rating();

    for _ in 0..3 {
        rating
            .record_battle(request("a", "b", BattleMode::Casual))
            .await
            .unwrap();
    }
    rating
        .record_battle(request("c", "d", BattleMode::Casual))
        .await
        .unwrap();

    let board = rating.leaderboard(BattleMode::Casual, 10).await.unwrap();
    let ranked: Vec<_> = board.iter().map(|e| e.participant.as_str()).collect();
    assert_eq!(ranked, ["a", "b"]);
    assert_eq!(board[0].rank, 1);
    assert!(board[0].stats.weighted_score > board[1].stats.weighted_score);
    assert_eq!(board[0].stats.weighted_score, 30.232);

    let ranked = rating.leaderboard(BattleMode::Competitive, 10).await.unwrap();
    assert!(ranked.is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn history_is_newest_first_and_filters_by_mode() {
    let runtime = in_memory().await;
    let rating = runtime.rating();

    let first = rating
        .record_battle(request("a", "b", BattleMode::Casual))
        .await
        .unwrap();
    let second = rating
        .record_battle(request("b", "a", BattleMode::Competitive))
        .await
        .unwrap();
    rating
        .record_battle(request("c", "d", BattleMode::Casual))
        .await
        .unwrap();

    let id = ParticipantId::new("a");
    let all = rating.history(&id, 10, None).await.unwrap();
    assert_eq!(
        all.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        [second.id.as_str(), first.id.as_str()]
    );

    let casual = rating
        .history(&id, 10, Some(BattleMode::Casual))
        .await
        .unwrap();
    assert_eq!(casual, vec![first]);

    assert_eq!(rating.history(&id, 1, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn disjoint_battles_commute() {
    let forward = in_memory().await;
    forward
        .rating()
        .record_battle(request("a", "b", BattleMode::Competitive))
        .await
        .unwrap();
    forward
        .rating()
        .record_battle(request("c", "d", BattleMode::Casual))
        .await
        .unwrap();

    let backward = in_memory().await;
    backward
        .rating()
        .record_battle(request("c", "d", BattleMode::Casual))
        .await
        .unwrap();
    backward
        .rating()
        .record_battle(request("a", "b", BattleMode::Competitive))
        .await
        .unwrap();

    for id in ["a", "b", "c", "d"] {
        assert_eq!(
            tracks(&forward.rating(), id).await,
            tracks(&backward.rating(), id).await
        );
    }
}

#[tokio::test]
async fn concurrent_settlements_are_serialized() {
    let runtime = in_memory().await;
    let rating = runtime.rating();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let rating = rating.clone();
        tasks.push(tokio::spawn(async move {
            rating
                .record_battle(request("a", "b", BattleMode::Casual))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let (casual, _) = tracks(&rating, "a").await;
    assert_eq!(casual.wins, 20);
    assert_eq!(casual.total, 20);
    let (casual, _) = tracks(&rating, "b").await;
    assert_eq!(casual.losses, 20);
}

#[tokio::test]
async fn injected_repository_receives_records() {
    let repository = Arc::new(InMemoryRatingRepository::new());
    let runtime = BattleRuntime::builder()
        .config(RuntimeConfig::instant())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();

    runtime
        .rating()
        .record_battle(request("a", "b", BattleMode::Competitive))
        .await
        .unwrap();

    assert_eq!(repository.load_records().unwrap().len(), 1);
    let profiles = repository.load_profiles().unwrap();
    assert_eq!(profiles[&ParticipantId::new("a")].competitive.record.wins, 1);
}

/// Keeps records in memory but fails every profile write.
#[derive(Default)]
struct ProfileWriteFails {
    inner: InMemoryRatingRepository,
}

impl RatingRepository for ProfileWriteFails {
    fn load_profiles(&self) -> RepoResult<ProfileMap> {
        self.inner.load_profiles()
    }

    fn save_profiles(&self, _profiles: &ProfileMap) -> RepoResult<()> {
        Err(std::io::Error::other("stats volume full").into())
    }

    fn load_records(&self) -> RepoResult<Vec<BattleRecord>> {
        self.inner.load_records()
    }

    fn commit_battle(&self, record: &BattleRecord, profiles: &ProfileMap) -> RepoResult<()> {
        self.save_profiles(profiles)?;
        self.inner.commit_battle(record, profiles)
    }
}

#[tokio::test]
async fn failed_profile_write_records_nothing() {
    let repository = Arc::new(ProfileWriteFails::default());
    let runtime = BattleRuntime::builder()
        .config(RuntimeConfig::instant())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let rating = runtime.rating();

    let result = rating
        .record_battle(request("a", "b", BattleMode::Casual))
        .await;
    assert!(matches!(
        result,
        Err(RuntimeError::Repository(RepositoryError::Io(_)))
    ));

    let a = ParticipantId::new("a");
    assert!(rating.history(&a, 10, None).await.unwrap().is_empty());
    assert_eq!(rating.profile(&a).await.unwrap(), None);
    assert!(repository.load_records().unwrap().is_empty());
    assert!(rating.leaderboard(BattleMode::Casual, 10).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn file_repository_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        data_dir: Some(dir.path().to_path_buf()),
        rng_seed: Some(11),
        ..RuntimeConfig::instant()
    };

    let runtime = BattleRuntime::builder()
        .config(config.clone())
        .build()
        .await
        .unwrap();

    let mut recorded = None;
    for round in 0..10 {
        let handle = runtime
            .start_session(SessionRequest::new(
                format!("guild-{round}"),
                participant("1001"),
                participant("1002"),
                BattleMode::Casual,
            ))
            .unwrap();
        let outcome = handle.settled().await;
        if let Some(record) = outcome.settlement().and_then(|s| s.record.clone()) {
            recorded = Some(record);
            break;
        }
    }
    let record = recorded.expect("ten casual battles cannot all be draws");
    runtime.shutdown().await.unwrap();

    assert!(dir.path().join("battle_records.json").exists());
    assert!(dir.path().join("battle_stats.json").exists());

    let restarted = BattleRuntime::builder()
        .config(config)
        .build()
        .await
        .unwrap();
    let history = restarted
        .rating()
        .history(&record.winner, 10, None)
        .await
        .unwrap();
    assert_eq!(history, vec![record.clone()]);

    let profile = restarted
        .rating()
        .profile(&record.winner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.casual.record.wins, 1);
    assert_eq!(profile.label, record.winner_label);
}

#[tokio::test]
async fn recompute_reports_no_changes_on_consistent_profiles() {
    let runtime = in_memory().await;
    let rating = runtime.rating();
    rating
        .record_battle(request("a", "b", BattleMode::Casual))
        .await
        .unwrap();

    assert_eq!(rating.recompute_weighted_scores().await.unwrap(), 0);
}
