//! # PostgreSQL Task Repository
//!
//! sqlx-backed implementation of [`TaskRepository`]. Queries are
//! runtime-checked; dynamic filtering and sorting go through
//! `sqlx::QueryBuilder` with bound parameters and a whitelisted sort-column
//! set, so no request input reaches the SQL text.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, QueryBuilder};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::RepositoryError;
use crate::models::Task;

use super::{SortSpec, TaskFilter, TaskRepository};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, status, priority, created_at, updated_at FROM tasks";

/// Columns callers may sort by.
const SORT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "status",
    "priority",
    "created_at",
    "updated_at",
];

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool)
            .connect(&config.url())
            .await?;
        debug!(host = %config.host, database = %config.name, "connected to postgres");
        Ok(Self::new(pool))
    }

    /// Bootstrap the tasks table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id          TEXT PRIMARY KEY,
                title       VARCHAR(100) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status      VARCHAR(20) NOT NULL,
                priority    INTEGER NOT NULL DEFAULT 0,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO tasks (id, title, description, status, priority, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Task, RepositoryError> {
        let task = sqlx::query_as::<_, Task>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        task.ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    async fn get_all(
        &self,
        filter: &TaskFilter,
        sort: Option<&SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, RepositoryError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(SELECT_COLUMNS);

        let mut has_where = false;
        if let Some(status) = &filter.status {
            builder.push(" WHERE status = ");
            builder.push_bind(status.clone());
            has_where = true;
        }
        if let Some(priority) = filter.priority {
            builder.push(if has_where { " AND " } else { " WHERE " });
            builder.push("priority = ");
            builder.push_bind(priority);
        }

        match sort {
            Some(spec) => {
                let column = SORT_COLUMNS
                    .iter()
                    .find(|candidate| **candidate == spec.field)
                    .ok_or_else(|| RepositoryError::InvalidSort {
                        field: spec.field.clone(),
                    })?;
                builder.push(format!(" ORDER BY {column} {}", spec.order.as_sql()));
            }
            None => {
                builder.push(" ORDER BY created_at ASC, id ASC");
            }
        }

        // An offset too large for i64 can only describe a window past the
        // end of the table.
        let Some((limit, offset)) = sql_window(page, page_size) else {
            return Ok(Vec::new());
        };
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let tasks = builder
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, priority = $5, updated_at = $6
            WHERE id = $1
            ",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}

/// LIMIT/OFFSET for a 1-based page window, clamping `page`/`page_size` to at
/// least 1. `None` when the offset does not fit an i64.
fn sql_window(page: usize, page_size: usize) -> Option<(i64, i64)> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let limit = i64::try_from(page_size).unwrap_or(i64::MAX);
    let offset = (page - 1)
        .checked_mul(page_size)
        .and_then(|offset| i64::try_from(offset).ok())?;
    Some((limit, offset))
}
