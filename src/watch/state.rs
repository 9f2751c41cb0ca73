//! # Shared sitter state: the player set and the shutdown deadline.
//!
//! One [`SitterState`] instance is shared by the line handlers (which mutate
//! it) and the idle scheduler (which reads it). Both pieces of data live
//! behind a single mutex so a join/leave race can never lose an update, and
//! so a deadline reset performed by a leave handler is visible to the
//! scheduler's next read.
//!
//! The emptiness signal is a [`Notify`] used single-slot style: only "the
//! set became empty since the scheduler last waited" matters. A stale permit
//! costs the scheduler one extra loop iteration, which re-reads the state
//! and blocks again.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

struct Inner {
    players: HashSet<String>,
    deadline: Instant,
}

/// Player presence plus the idle shutdown deadline, under one lock.
pub(crate) struct SitterState {
    inner: Mutex<Inner>,
    emptied: Notify,
}

impl SitterState {
    /// Creates state for a freshly launched server: no players, deadline at
    /// `now + start_wait`.
    pub fn new(start_wait: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                players: HashSet::new(),
                deadline: Instant::now() + start_wait,
            }),
            emptied: Notify::new(),
        }
    }

    /// Records a join and returns the sorted roster snapshot.
    ///
    /// Duplicate joins of the same name leave the set unchanged.
    pub async fn add_player(&self, name: &str) -> BTreeSet<String> {
        let mut inner = self.inner.lock().await;
        inner.players.insert(name.to_string());
        inner.players.iter().cloned().collect()
    }

    /// Records a leave and returns the sorted roster snapshot.
    ///
    /// Removing an unknown name is a no-op on the set.
    pub async fn remove_player(&self, name: &str) -> BTreeSet<String> {
        let mut inner = self.inner.lock().await;
        inner.players.remove(name);
        inner.players.iter().cloned().collect()
    }

    /// Re-arms the deadline to `now + drain_wait` and raises the emptiness
    /// signal, waking a suspended scheduler.
    pub async fn arm_drain(&self, drain_wait: Duration) {
        {
            let mut inner = self.inner.lock().await;
            inner.deadline = Instant::now() + drain_wait;
        }
        self.emptied.notify_one();
    }

    /// Current shutdown deadline.
    pub async fn deadline(&self) -> Instant {
        self.inner.lock().await.deadline
    }

    /// Whether any player is connected.
    pub async fn has_players(&self) -> bool {
        !self.inner.lock().await.players.is_empty()
    }

    /// Waits until the set has become empty since the last wait.
    pub async fn emptied(&self) {
        self.emptied.notified().await;
    }
}
