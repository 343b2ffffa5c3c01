use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::quiz::session::SessionState;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug)]
struct Entry {
    state: SessionState,
    last_seen: Instant,
}

/// Session states kept in process memory, keyed by the id in the session cookie.
///
/// Ids are only ever issued by [`InMemStorage::insert`]. Sessions idle for longer than the
/// timeout are dropped, and the map never holds more than `capacity` entries.
#[derive(Debug)]
pub struct InMemStorage {
    map: Mutex<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
    capacity: usize,
}

impl Default for InMemStorage {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_CAPACITY)
    }
}

impl InMemStorage {
    pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            idle_timeout,
            capacity: capacity.max(1),
        }
    }

    /// Stores a new session under a freshly issued id.
    pub async fn insert(&self, state: SessionState) -> Uuid {
        let mut map = self.map.lock().await;
        let now = Instant::now();

        if map.len() >= self.capacity {
            map.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        }
        if map.len() >= self.capacity {
            let oldest = map
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                log::debug!("Session store full, evicting the least recently used session");
                map.remove(&oldest);
            }
        }

        let id = Uuid::new_v4();
        map.insert(
            id,
            Entry {
                state,
                last_seen: now,
            },
        );
        id
    }

    /// Runs `f` on the stored state while holding the lock, so steps of one session never
    /// interleave. Returns `None` for an unknown or expired id.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SessionState) -> T,
    ) -> Option<T> {
        let mut map = self.map.lock().await;
        let now = Instant::now();

        let entry = map.get_mut(&id)?;
        if now.duration_since(entry.last_seen) > self.idle_timeout {
            map.remove(&id);
            return None;
        }
        entry.last_seen = now;
        Some(f(&mut entry.state))
    }

    pub async fn remove_session(&self, id: Uuid) {
        self.map.lock().await.remove(&id);
    }

    /// Drops every idle session and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut map = self.map.lock().await;
        let now = Instant::now();
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        before - map.len()
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }
}

/// Sweeps idle sessions every `period` until the runtime shuts down.
pub fn spawn_sweeper(storage: Arc<InMemStorage>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        loop {
            ticks.tick().await;
            let removed = storage.sweep().await;
            if removed > 0 {
                log::debug!("Swept {} idle sessions", removed);
            }
        }
    })
}
