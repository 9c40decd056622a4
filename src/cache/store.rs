//! # Backing Store Abstraction
//!
//! The cache facade depends on a capability set rather than a concrete
//! remote store: a key-to-bytes map, an ordered index supporting
//! upsert-with-score and rank-range queries, and named membership sets.
//! [`super::redis::RedisStore`] implements it against Redis;
//! [`MemoryStore`] is a process-local implementation used by tests and as a
//! reference for the ordering contract.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::CacheError;

/// Remote-store capabilities required by the cache facade.
///
/// Ordered-index semantics: members are ordered by ascending `score`, with
/// ties broken by ascending insertion sequence `seq`. Re-inserting an
/// existing member replaces its previous position. `zrange` takes inclusive
/// zero-based ranks; a window past the end yields a short or empty result.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn zadd(&self, key: &str, member: &str, score: i64, seq: u64)
        -> Result<(), CacheError>;
    async fn zrem(&self, key: &str, member: &str) -> Result<(), CacheError>;
    async fn zrange(&self, key: &str, start: usize, stop: usize)
        -> Result<Vec<String>, CacheError>;

    async fn sadd(&self, key: &str, member: &str) -> Result<(), CacheError>;
    async fn srem(&self, key: &str, member: &str) -> Result<(), CacheError>;
    async fn smembers(&self, key: &str) -> Result<HashSet<String>, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
    async fn close(&self) -> Result<(), CacheError>;
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, Vec<u8>>,
    // (score, seq, member) gives the exact ordering contract for free.
    indexes: HashMap<String, BTreeSet<(i64, u64, String)>>,
    sets: HashMap<String, HashSet<String>>,
}

/// In-process [`CacheStore`]. Cloning yields handles to the same data, which
/// lets tests keep a view on the store a facade owns.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.inner
            .lock()
            .values
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.lock().values.remove(key);
        Ok(())
    }

    async fn zadd(
        &self,
        key: &str,
        member: &str,
        score: i64,
        seq: u64,
    ) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        let index = inner.indexes.entry(key.to_string()).or_default();
        index.retain(|(_, _, m)| m != member);
        index.insert((score, seq, member.to_string()));
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        if let Some(index) = inner.indexes.get_mut(key) {
            index.retain(|(_, _, m)| m != member);
        }
        Ok(())
    }

    async fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>, CacheError> {
        if stop < start {
            return Ok(Vec::new());
        }
        let inner = self.inner.lock();
        let Some(index) = inner.indexes.get(key) else {
            return Ok(Vec::new());
        };
        Ok(index
            .iter()
            .skip(start)
            .take(stop.saturating_sub(start).saturating_add(1))
            .map(|(_, _, m)| m.clone())
            .collect())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), CacheError> {
        self.inner
            .lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        if let Some(set) = inner.sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<HashSet<String>, CacheError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
