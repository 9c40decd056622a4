//! # Caching Subsystem
//!
//! Bounded write-through cache over a remote key-value/ordered-set/set
//! store. Three coupled structures are kept consistent under insert, update,
//! delete and LRU eviction:
//!
//! - the value store, holding the canonical cached copy of each task,
//! - the pagination index, ordered by creation time for rank-range reads,
//! - the per-status membership sets for status filtering.
//!
//! [`LruTaskCache`] orchestrates them as one unit; the in-process
//! [`tracker::EvictionTracker`] bounds tracked entries and picks eviction
//! victims. The cache is a volatile accelerator, never a record of truth.

pub mod facade;
pub mod redis;
pub mod store;
pub mod tracker;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::models::Task;

pub use facade::LruTaskCache;
pub use redis::RedisStore;
pub use store::{CacheStore, MemoryStore};

/// Facade contract consumed by the service layer.
///
/// Reads that miss return [`CacheError::NotFound`]; the caller is expected
/// to fall back to the repository without the cache learning the result.
#[async_trait]
pub trait TaskCache: Send + Sync {
    async fn add_task(&self, task: &Task) -> Result<(), CacheError>;

    async fn get_task(&self, id: &str) -> Result<Task, CacheError>;

    /// Ordered page of tasks for the 1-based `page` window. Fails fast when
    /// any indexed id is missing its value; callers wanting resilience retry
    /// against the repository.
    async fn get_paginated_tasks(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, CacheError>;

    async fn update_task(&self, task: &Task) -> Result<(), CacheError>;

    /// Deleting an id absent from the value store is [`CacheError::NotFound`],
    /// not a no-op.
    async fn delete_task(&self, id: &str) -> Result<(), CacheError>;

    async fn close(&self) -> Result<(), CacheError>;
}
