//! # Task Service
//!
//! Orchestrates the source-of-truth repository and the write-through cache.
//! Writes go to the repository first and then through the cache; reads try
//! the cache and fall back to the repository on a miss or any cache failure.
//! The cache is never back-filled from repository reads.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::TaskCache;
use crate::error::{CacheError, ServiceError};
use crate::models::{Task, TaskChanges};
use crate::repository::{SortSpec, TaskFilter, TaskRepository};

pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    cache: Arc<dyn TaskCache>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>, cache: Arc<dyn TaskCache>) -> Self {
        Self { repository, cache }
    }

    /// Persist a new task, then write it through the cache.
    pub async fn create_task(&self, task: &Task) -> Result<(), ServiceError> {
        self.repository.create(task).await?;
        self.cache.add_task(task).await?;
        Ok(())
    }

    /// Cache-first point read with repository fallback.
    pub async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        match self.cache.get_task(id).await {
            Ok(task) => Ok(task),
            Err(CacheError::NotFound { .. }) => {
                debug!(id, "cache miss, reading from repository");
                Ok(self.repository.get_by_id(id).await?)
            }
            Err(err) => {
                warn!(id, error = %err, "cache read failed, falling back to repository");
                Ok(self.repository.get_by_id(id).await?)
            }
        }
    }

    /// Paged listing. Unfiltered, unsorted requests are served from the
    /// cache's pagination index when it can produce a full page; everything
    /// else goes to the repository.
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        sort: Option<&SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, ServiceError> {
        if filter.is_empty() && sort.is_none() {
            match self.cache.get_paginated_tasks(page, page_size).await {
                Ok(tasks) if tasks.len() == page_size => return Ok(tasks),
                Ok(tasks) => {
                    // A short page may just mean the cache holds fewer tasks
                    // than the system of record; let the repository decide.
                    debug!(
                        page,
                        page_size,
                        cached = tasks.len(),
                        "cached page incomplete, reading from repository"
                    );
                }
                Err(err) => {
                    warn!(error = %err, "cached page read failed, falling back to repository");
                }
            }
        }
        Ok(self
            .repository
            .get_all(filter, sort, page, page_size)
            .await?)
    }

    /// Apply a partial update against the stored record, persist it, then
    /// refresh the cache.
    pub async fn update_task(&self, id: &str, changes: TaskChanges) -> Result<Task, ServiceError> {
        let mut task = self.repository.get_by_id(id).await?;
        task.apply(changes);
        self.repository.update(&task).await?;
        self.cache.update_task(&task).await?;
        Ok(task)
    }

    /// Delete from the repository, then drop any cached copy. A cache miss
    /// is tolerated: the id may never have been cached, or was evicted.
    pub async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        self.repository.delete(id).await?;
        match self.cache.delete_task(id).await {
            Ok(()) | Err(CacheError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
