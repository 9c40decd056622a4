//! # Cache Facade
//!
//! Write-through LRU cache over the three coupled backing structures: the
//! value store (`task:{id}` -> JSON record), the pagination index
//! (`tasks:index`, ordered by creation time) and the per-status membership
//! sets (`tasks:status:{status}`).
//!
//! Every public operation is a compound transaction over those structures
//! plus the in-process eviction tracker, executed under a single
//! per-instance lock so the net effect is linearizable with respect to other
//! calls on the same instance. Failure policy is fail fast: the first
//! failing backing-store call aborts the remaining steps and propagates the
//! error with no compensating rollback, so a failed write can leave the
//! structures temporarily inconsistent until the affected id is written or
//! deleted again.
//!
//! The cache is fed exclusively by writes flowing through it; misses are
//! never back-filled from the repository, and the tracker only approximates
//! backing-store occupancy when entries can arrive through other channels.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::error::CacheError;
use crate::models::Task;

use super::redis::RedisStore;
use super::store::CacheStore;
use super::tracker::{EvictionTracker, Touch};
use super::TaskCache;

const PAGINATION_INDEX_KEY: &str = "tasks:index";

fn value_key(id: &str) -> String {
    format!("task:{id}")
}

fn status_key(status: &str) -> String {
    format!("tasks:status:{status}")
}

struct CacheState {
    tracker: EvictionTracker,
    /// Monotonic insertion sequence; tie-break for equal creation times in
    /// the pagination index.
    seq: u64,
}

/// Fixed-capacity write-through task cache over a [`CacheStore`] backend.
pub struct LruTaskCache<S: CacheStore> {
    store: S,
    state: Mutex<CacheState>,
}

impl<S: CacheStore> LruTaskCache<S> {
    /// Wrap an already-connected store, bounding the tracked entries at
    /// `max_size`.
    pub fn new(store: S, max_size: usize) -> Self {
        Self {
            store,
            state: Mutex::new(CacheState {
                tracker: EvictionTracker::new(max_size),
                seq: 0,
            }),
        }
    }

    /// Number of ids currently tracked by the eviction tracker.
    pub async fn tracked_len(&self) -> usize {
        self.state.lock().await.tracker.len()
    }

    /// Shared body of add and update: overwrite the value, re-index, clean
    /// a stale status membership, refresh recency, then evict if the insert
    /// pushed the tracked count past capacity.
    async fn upsert(&self, task: &Task) -> Result<(), CacheError> {
        let payload =
            serde_json::to_vec(task).map_err(|err| CacheError::serialization(&err))?;

        let mut state = self.state.lock().await;

        // The prior status decides which membership set to clean when the
        // status changes. The tracker remembers it for tracked ids; for an
        // untracked id the stored value is consulted before the overwrite.
        let prev_status = match state.tracker.status_of(&task.id) {
            Some(status) => Some(status.to_string()),
            None => match self.store.get(&value_key(&task.id)).await? {
                Some(bytes) => {
                    let stored: Task = serde_json::from_slice(&bytes)
                        .map_err(|err| CacheError::serialization(&err))?;
                    Some(stored.status)
                }
                None => None,
            },
        };

        self.store.set(&value_key(&task.id), &payload).await?;

        let seq = state.seq;
        state.seq += 1;
        self.store
            .zadd(
                PAGINATION_INDEX_KEY,
                &task.id,
                task.created_at.timestamp(),
                seq,
            )
            .await?;

        self.store
            .sadd(&status_key(&task.status), &task.id)
            .await?;
        if let Some(prev) = prev_status {
            if prev != task.status {
                self.store.srem(&status_key(&prev), &task.id).await?;
            }
        }

        if state.tracker.touch(&task.id, &task.status) == Touch::Inserted {
            if let Some((evicted_id, evicted_status)) =
                state.tracker.evict_if_over_capacity()
            {
                debug!(id = %evicted_id, "evicting least-recently-used task");
                self.store.delete(&value_key(&evicted_id)).await?;
                self.store.zrem(PAGINATION_INDEX_KEY, &evicted_id).await?;
                self.store
                    .srem(&status_key(&evicted_status), &evicted_id)
                    .await?;
            }
        }

        Ok(())
    }
}

impl LruTaskCache<RedisStore> {
    /// Connect to the configured Redis backend. Fails when the backend is
    /// unreachable.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let store = RedisStore::connect(config).await?;
        Ok(Self::new(store, config.max_cache_size))
    }
}

#[async_trait::async_trait]
impl<S: CacheStore> TaskCache for LruTaskCache<S> {
    async fn add_task(&self, task: &Task) -> Result<(), CacheError> {
        self.upsert(task).await
    }

    async fn update_task(&self, task: &Task) -> Result<(), CacheError> {
        self.upsert(task).await
    }

    async fn get_task(&self, id: &str) -> Result<Task, CacheError> {
        let mut state = self.state.lock().await;

        let bytes = self
            .store
            .get(&value_key(id))
            .await?
            .ok_or_else(|| CacheError::not_found(id))?;
        let task: Task = serde_json::from_slice(&bytes)
            .map_err(|err| CacheError::serialization(&err))?;

        // Reads promote tracked ids but never re-register untracked ones;
        // an entry that bypassed the write path stays outside the tracker.
        state.tracker.promote(id);
        Ok(task)
    }

    async fn get_paginated_tasks(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, CacheError> {
        if page < 1 || page_size < 1 {
            return Err(CacheError::invalid_argument(format!(
                "page and page_size must be >= 1 (got page={page}, page_size={page_size})"
            )));
        }

        // A window whose start rank overflows usize lies past the end of any
        // real index: an empty page, not an error.
        let Some(start) = (page - 1).checked_mul(page_size) else {
            return Ok(Vec::new());
        };
        let stop = start.saturating_add(page_size - 1);

        let _state = self.state.lock().await;
        let ids = self
            .store
            .zrange(PAGINATION_INDEX_KEY, start, stop)
            .await?;

        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            // An indexed id whose value is gone means the coupled structures
            // have diverged; fail the whole page rather than skip it.
            let bytes = self.store.get(&value_key(&id)).await?.ok_or_else(|| {
                warn!(id = %id, "pagination index references a missing value");
                CacheError::Io {
                    operation: "get_paginated_tasks",
                    message: format!("indexed task {id} missing from value store"),
                }
            })?;
            let task: Task = serde_json::from_slice(&bytes)
                .map_err(|err| CacheError::serialization(&err))?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    async fn delete_task(&self, id: &str) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;

        // The stored record decides which status set to clean.
        let bytes = self
            .store
            .get(&value_key(id))
            .await?
            .ok_or_else(|| CacheError::not_found(id))?;
        let task: Task = serde_json::from_slice(&bytes)
            .map_err(|err| CacheError::serialization(&err))?;

        self.store.delete(&value_key(id)).await?;
        self.store.zrem(PAGINATION_INDEX_KEY, id).await?;
        self.store.srem(&status_key(&task.status), id).await?;
        state.tracker.remove(id);
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.store.close().await
    }
}

/// Membership-set key for a status value, exposed for callers that inspect
/// the status index directly.
pub fn status_set_key(status: &str) -> String {
    status_key(status)
}

/// Key of the creation-time pagination index.
pub const fn pagination_index_key() -> &'static str {
    PAGINATION_INDEX_KEY
}

/// Value-store key for a task id.
pub fn task_value_key(id: &str) -> String {
    value_key(id)
}
