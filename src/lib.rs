#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskrec
//!
//! Task-record service backed by a PostgreSQL system of record and fronted
//! by a bounded, write-through Redis cache.
//!
//! ## Architecture
//!
//! The caching subsystem is the core: a fixed-capacity LRU cache keeping
//! three coupled remote structures (the value store, a creation-time-ordered
//! pagination index, and per-status membership sets) consistent under
//! insert, update, delete and eviction. Everything else collaborates
//! around it:
//!
//! - [`repository`] - the opaque source-of-truth over PostgreSQL
//! - [`cache`] - the write-through LRU cache and its backing-store trait
//! - [`services`] - the facade trying the cache before the repository
//! - [`messaging`] - asynchronous ingestion feeding the same operations
//! - [`web`] - the axum HTTP surface
//! - [`config`] - YAML configuration with environment overlays
//! - [`error`] - structured error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskrec::cache::{LruTaskCache, MemoryStore};
//! use taskrec::cache::TaskCache;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = LruTaskCache::new(MemoryStore::new(), 100);
//! let page = cache.get_paginated_tasks(1, 10).await?;
//! assert!(page.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod repository;
pub mod services;
pub mod web;

pub use cache::{LruTaskCache, MemoryStore, RedisStore, TaskCache};
pub use config::{ConfigManager, TaskrecConfig};
pub use error::{CacheError, RepositoryError, Result, ServiceError, TaskrecError};
pub use models::{Task, TaskChanges};
pub use repository::{PostgresTaskRepository, SortOrder, SortSpec, TaskFilter, TaskRepository};
pub use services::TaskService;
