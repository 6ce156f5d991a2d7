//! Session lock registry.
//!
//! One process-wide table keyed by arena. Every operation first purges
//! entries older than the staleness timeout, so a session that crashed
//! without releasing can block its arena and participants for at most that
//! long. All access goes through a single mutex; the table holds one entry per
//! live session, so coarse serialization is cheap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use battle_core::ParticipantId;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::ArenaId;

/// Why an acquire was refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LockDenial {
    #[error("a session is already running in this arena")]
    ArenaBusy,

    #[error("participant {0} is already in a session")]
    ParticipantBusy(ParticipantId),
}

#[derive(Debug)]
struct LockEntry {
    participants: Vec<ParticipantId>,
    acquired_at: Instant,
    token: u64,
}

#[derive(Debug, Default)]
struct LockTable {
    entries: HashMap<ArenaId, LockEntry>,
    next_token: u64,
}

impl LockTable {
    fn sweep(&mut self, timeout: Duration) {
        let now = Instant::now();
        self.entries.retain(|arena, entry| {
            let stale = now.duration_since(entry.acquired_at) >= timeout;
            if stale {
                warn!(
                    arena = %arena,
                    held_for = ?now.duration_since(entry.acquired_at),
                    "purging stale session lock"
                );
            }
            !stale
        });
    }

    fn check(&self, arena: &ArenaId, participants: &[ParticipantId]) -> Result<(), LockDenial> {
        if self.entries.contains_key(arena) {
            return Err(LockDenial::ArenaBusy);
        }
        for participant in participants {
            if self.is_busy(participant) {
                return Err(LockDenial::ParticipantBusy(participant.clone()));
            }
        }
        Ok(())
    }

    fn is_busy(&self, participant: &ParticipantId) -> bool {
        self.entries
            .values()
            .any(|entry| entry.participants.contains(participant))
    }

    fn insert(&mut self, arena: &ArenaId, participants: &[ParticipantId]) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        self.entries.insert(
            arena.clone(),
            LockEntry {
                participants: participants.to_vec(),
                acquired_at: Instant::now(),
                token,
            },
        );
        token
    }
}

/// Cloneable handle to the shared lock table.
#[derive(Clone, Debug)]
pub struct SessionLockRegistry {
    table: Arc<Mutex<LockTable>>,
    timeout: Duration,
}

impl SessionLockRegistry {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(LockTable::default())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn swept(&self) -> MutexGuard<'_, LockTable> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.sweep(self.timeout);
        table
    }

    /// Insert an entry unless the arena or any participant is already locked.
    ///
    /// The entry stays until [`Self::release`] or the staleness sweep removes it.
    pub fn acquire(&self, arena: &ArenaId, participants: &[ParticipantId]) -> bool {
        let mut table = self.swept();
        if table.check(arena, participants).is_err() {
            return false;
        }
        table.insert(arena, participants);
        true
    }

    /// Like [`Self::acquire`], but the entry is released when the guard drops.
    pub fn try_acquire(
        &self,
        arena: &ArenaId,
        participants: &[ParticipantId],
    ) -> Result<LockGuard, LockDenial> {
        let mut table = self.swept();
        table.check(arena, participants)?;
        let token = table.insert(arena, participants);
        debug!(arena = %arena, token, "session lock acquired");
        Ok(LockGuard {
            table: Arc::clone(&self.table),
            arena: arena.clone(),
            token,
        })
    }

    /// Remove the arena's entry. Returns whether one existed.
    pub fn release(&self, arena: &ArenaId) -> bool {
        self.swept().entries.remove(arena).is_some()
    }

    pub fn is_participant_busy(&self, participant: &ParticipantId) -> bool {
        self.swept().is_busy(participant)
    }

    pub fn is_locked(&self, arena: &ArenaId) -> bool {
        self.swept().entries.contains_key(arena)
    }

    /// Number of live (non-stale) entries.
    pub fn active(&self) -> usize {
        self.swept().entries.len()
    }
}

impl Default for SessionLockRegistry {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

/// Scoped ownership of one lock entry.
///
/// Dropping the guard removes the entry, but only if it is still the entry
/// this guard created: a stale entry that was swept and re-acquired by a new
/// session is left alone.
#[derive(Debug)]
pub struct LockGuard {
    table: Arc<Mutex<LockTable>>,
    arena: ArenaId,
    token: u64,
}

impl LockGuard {
    pub fn arena(&self) -> &ArenaId {
        &self.arena
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if table
            .entries
            .get(&self.arena)
            .is_some_and(|entry| entry.token == self.token)
        {
            table.entries.remove(&self.arena);
            debug!(arena = %self.arena, token = self.token, "session lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ParticipantId> {
        raw.iter().map(|id| ParticipantId::new(*id)).collect()
    }

    #[tokio::test]
    async fn arena_and_participants_are_exclusive() {
        let registry = SessionLockRegistry::default();
        let guild = ArenaId::new("guild");
        let other = ArenaId::new("other");

        assert!(registry.acquire(&guild, &ids(&["a", "b"])));
        assert!(!registry.acquire(&guild, &ids(&["c", "d"])));
        assert!(!registry.acquire(&other, &ids(&["b", "c"])));
        assert!(registry.is_participant_busy(&ParticipantId::new("a")));
        assert!(!registry.is_participant_busy(&ParticipantId::new("c")));

        assert!(registry.release(&guild));
        assert!(!registry.release(&guild));
        assert!(registry.acquire(&other, &ids(&["b", "c"])));
    }

    #[tokio::test]
    async fn denial_names_the_reason() {
        let registry = SessionLockRegistry::default();
        let _held = registry
            .try_acquire(&ArenaId::new("one"), &ids(&["a", "b"]))
            .expect("first acquire");

        let err = registry
            .try_acquire(&ArenaId::new("one"), &ids(&["x", "y"]))
            .unwrap_err();
        assert_eq!(err, LockDenial::ArenaBusy);

        let err = registry
            .try_acquire(&ArenaId::new("two"), &ids(&["x", "b"]))
            .unwrap_err();
        assert_eq!(err, LockDenial::ParticipantBusy(ParticipantId::new("b")));
    }

    #[tokio::test]
    async fn guard_releases_on_drop() {
        let registry = SessionLockRegistry::default();
        let arena = ArenaId::new("guild");
        {
            let _guard = registry.try_acquire(&arena, &ids(&["a", "b"])).unwrap();
            assert!(registry.is_locked(&arena));
        }
        assert!(!registry.is_locked(&arena));
        assert!(!registry.is_participant_busy(&ParticipantId::new("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entries_are_swept_on_next_access() {
        let registry = SessionLockRegistry::default();
        let arena = ArenaId::new("guild");
        assert!(registry.acquire(&arena, &ids(&["a", "b"])));

        tokio::time::advance(Duration::from_secs(4 * 60)).await;
        assert!(registry.is_locked(&arena));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!registry.is_participant_busy(&ParticipantId::new("a")));
        assert_eq!(registry.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_guard_does_not_release_successor() {
        let registry = SessionLockRegistry::new(Duration::from_secs(10));
        let arena = ArenaId::new("guild");
        let stale = registry.try_acquire(&arena, &ids(&["a", "b"])).unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        let fresh = registry.try_acquire(&arena, &ids(&["c", "d"])).unwrap();

        drop(stale);
        assert!(registry.is_locked(&arena));
        drop(fresh);
        assert!(!registry.is_locked(&arena));
    }
}
