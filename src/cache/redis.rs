//! # Redis Backing Store
//!
//! [`CacheStore`] implementation over Redis using a `deadpool-redis`
//! connection pool. Every remote call is bounded by the configured operation
//! timeout; an elapsed timeout surfaces as [`CacheError::Timeout`], which
//! callers treat as retryable I/O rather than a permanent failure.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use crate::config::RedisConfig;
use crate::error::CacheError;

use super::store::CacheStore;

/// Sequence modulus folded into the fractional part of an ordered-index
/// score. The integer part stays the epoch-seconds creation time; the
/// fraction orders same-second inserts by insertion sequence. After the
/// modulus wraps within a single second, ordering falls back to Redis's
/// lexicographic member tie-break, which is still deterministic.
const SEQ_MODULUS: u64 = 4096;

fn encode_score(score: i64, seq: u64) -> f64 {
    score as f64 + ((seq % SEQ_MODULUS) as f64 / SEQ_MODULUS as f64) * 1e-3
}

/// Ranks above `isize::MAX` would wrap negative in the cast, and Redis reads
/// negative ranks as from-the-end indices. Clamping keeps such ranks past the
/// end of any real index, yielding an empty range.
fn clamp_rank(rank: usize) -> isize {
    isize::try_from(rank).unwrap_or(isize::MAX)
}

pub struct RedisStore {
    pool: Pool,
    op_timeout: Duration,
}

impl RedisStore {
    /// Build a pool from configuration and verify the server is reachable.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let pool = PoolConfig::from_url(config.url())
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| CacheError::Connection {
                message: err.to_string(),
            })?;

        let store = Self {
            pool,
            op_timeout: Duration::from_millis(config.operation_timeout_ms),
        };
        store.ping().await?;
        debug!(addr = %config.addr, db = config.db, "connected to redis cache backend");
        Ok(store)
    }

    /// Acquire a pooled connection under the operation timeout. Pool growth
    /// opens a TCP connection, so acquisition is a remote call too and must
    /// not block the facade's critical section indefinitely.
    async fn conn(&self) -> Result<deadpool_redis::Connection, CacheError> {
        match tokio::time::timeout(self.op_timeout, self.pool.get()).await {
            Err(_) => Err(CacheError::Timeout {
                operation: "acquire_connection",
                timeout_ms: self.op_timeout.as_millis() as u64,
            }),
            Ok(result) => result.map_err(|err| CacheError::Connection {
                message: err.to_string(),
            }),
        }
    }

    /// Run one remote call under the operation timeout.
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Err(_) => Err(CacheError::Timeout {
                operation,
                timeout_ms: self.op_timeout.as_millis() as u64,
            }),
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(classify(operation, &err)),
        }
    }
}

fn classify(operation: &'static str, err: &redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Connection {
            message: err.to_string(),
        }
    } else {
        CacheError::Io {
            operation,
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn().await?;
        self.run("get", conn.get::<_, Option<Vec<u8>>>(key)).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run("set", conn.set::<_, _, ()>(key, value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run("del", conn.del::<_, i64>(key)).await?;
        Ok(())
    }

    async fn zadd(
        &self,
        key: &str,
        member: &str,
        score: i64,
        seq: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run(
            "zadd",
            conn.zadd::<_, _, _, i64>(key, member, encode_score(score, seq)),
        )
        .await?;
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run("zrem", conn.zrem::<_, _, i64>(key, member)).await?;
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
        let mut conn = self.conn().await?;
        self.run(
            "zrange",
            conn.zrange::<_, Vec<String>>(key, clamp_rank(start), clamp_rank(stop)),
        )
        .await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run("sadd", conn.sadd::<_, _, i64>(key, member)).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        self.run("srem", conn.srem::<_, _, i64>(key, member)).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<HashSet<String>, CacheError> {
        let mut conn = self.conn().await?;
        let members: Vec<String> = self.run("smembers", conn.smembers(key)).await?;
        Ok(members.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _pong: String = self
            .run("ping", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.pool.close();
        Ok(())
    }
}
