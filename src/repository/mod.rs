//! # Source-of-Truth Repository
//!
//! Persistence contract for task records. The repository is the system of
//! record; the cache mirrors it. Kept behind a trait so the service layer
//! and tests can run against alternate implementations.

pub mod postgres;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::Task;

pub use postgres::PostgresTaskRepository;

/// Equality filters for listing. An empty filter matches every task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<i32>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort request against a whitelisted column.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Task, RepositoryError>;

    /// Filtered, sorted, paginated listing. `page` is 1-based; values below
    /// 1 are clamped.
    async fn get_all(
        &self,
        filter: &TaskFilter,
        sort: Option<&SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// Updating a missing id is [`RepositoryError::NotFound`].
    async fn update(&self, task: &Task) -> Result<(), RepositoryError>;

    /// Deleting a missing id is [`RepositoryError::NotFound`].
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}
