//! Service facade tests: write-through on mutation, cache-first reads with
//! repository fallback, and cache-only listing for unfiltered full pages.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use taskrec::cache::{LruTaskCache, MemoryStore, TaskCache};
use taskrec::error::{CacheError, RepositoryError};
use taskrec::models::{Task, TaskChanges};
use taskrec::repository::{SortOrder, SortSpec, TaskFilter, TaskRepository};
use taskrec::services::TaskService;

const T0: i64 = 1_700_000_000;

fn task_at(id: &str, status: &str, created_secs: i64) -> Task {
    let created_at: DateTime<Utc> =
        DateTime::from_timestamp(created_secs, 0).expect("valid timestamp");
    Task {
        id: id.to_string(),
        title: format!("task {id}"),
        description: String::new(),
        status: status.to_string(),
        priority: 0,
        created_at,
        updated_at: created_at,
    }
}

/// Map-backed repository standing in for PostgreSQL.
#[derive(Default)]
struct InMemoryRepository {
    tasks: Mutex<HashMap<String, Task>>,
}

impl InMemoryRepository {
    fn seed(&self, task: Task) {
        self.tasks.lock().insert(task.id.clone(), task);
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        self.tasks.lock().insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Task, RepositoryError> {
        self.tasks
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    async fn get_all(
        &self,
        filter: &TaskFilter,
        sort: Option<&SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Task>, RepositoryError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .values()
            .filter(|task| {
                filter
                    .status
                    .as_ref()
                    .is_none_or(|status| task.status == *status)
                    && filter.priority.is_none_or(|priority| task.priority == priority)
            })
            .cloned()
            .collect();

        match sort {
            Some(spec) if spec.field == "priority" => {
                tasks.sort_by_key(|task| task.priority);
                if spec.order == SortOrder::Desc {
                    tasks.reverse();
                }
            }
            _ => tasks.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id))),
        }

        let start = (page.max(1) - 1) * page_size;
        Ok(tasks.into_iter().skip(start).take(page_size).collect())
    }

    async fn update(&self, task: &Task) -> Result<(), RepositoryError> {
        let mut tasks = self.tasks.lock();
        if !tasks.contains_key(&task.id) {
            return Err(RepositoryError::NotFound {
                id: task.id.clone(),
            });
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.tasks
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }
}

fn service_with(
    max_cache_size: usize,
) -> (TaskService, Arc<InMemoryRepository>, Arc<LruTaskCache<MemoryStore>>) {
    let repository = Arc::new(InMemoryRepository::default());
    let cache = Arc::new(LruTaskCache::new(MemoryStore::new(), max_cache_size));
    let service = TaskService::new(repository.clone(), cache.clone());
    (service, repository, cache)
}

#[tokio::test]
async fn create_writes_through_to_repository_and_cache() {
    let (service, repository, cache) = service_with(10);
    let task = task_at("a", "pending", T0);

    service.create_task(&task).await.unwrap();

    assert_eq!(repository.get_by_id("a").await.unwrap(), task);
    assert_eq!(cache.get_task("a").await.unwrap(), task);
}

#[tokio::test]
async fn cache_miss_falls_back_to_repository_without_backfill() {
    let (service, repository, cache) = service_with(10);
    // Present in the system of record but never written through the cache.
    let task = task_at("repo-only", "pending", T0);
    repository.seed(task.clone());

    assert_eq!(service.get_task("repo-only").await.unwrap(), task);

    // The cache did not learn the result.
    assert!(matches!(
        cache.get_task("repo-only").await.unwrap_err(),
        CacheError::NotFound { .. }
    ));
}

#[tokio::test]
async fn evicted_task_is_still_served_from_repository() {
    let (service, _repository, cache) = service_with(1);
    let first = task_at("a", "pending", T0);
    let second = task_at("b", "pending", T0 + 1);
    service.create_task(&first).await.unwrap();
    service.create_task(&second).await.unwrap();

    // "a" was evicted from the cache but survives in the system of record.
    assert!(matches!(
        cache.get_task("a").await.unwrap_err(),
        CacheError::NotFound { .. }
    ));
    assert_eq!(service.get_task("a").await.unwrap(), first);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (service, _repository, _cache) = service_with(10);
    let err = service.get_task("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unfiltered_full_page_is_served_from_cache() {
    let (service, repository, _cache) = service_with(10);
    for i in 0..3 {
        let id = format!("t{i}");
        service.create_task(&task_at(&id, "pending", T0 + i)).await.unwrap();
    }
    // Make the repository disagree so the source of the page is observable.
    repository.seed(task_at("repo-extra", "pending", T0 - 10));

    let page = service
        .list_tasks(&TaskFilter::default(), None, 1, 3)
        .await
        .unwrap();
    let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
    // A full cached page wins; the repository-only task does not appear.
    assert_eq!(ids, vec!["t0", "t1", "t2"]);
}

#[tokio::test]
async fn short_cached_page_falls_back_to_repository() {
    let (service, repository, _cache) = service_with(10);
    service.create_task(&task_at("cached", "pending", T0)).await.unwrap();
    repository.seed(task_at("repo-only", "pending", T0 - 10));

    let page = service
        .list_tasks(&TaskFilter::default(), None, 1, 2)
        .await
        .unwrap();
    let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
    // The cache could only produce one of two requested rows, so the
    // repository view (which also knows "repo-only") is returned.
    assert_eq!(ids, vec!["repo-only", "cached"]);
}

#[tokio::test]
async fn filtered_listing_bypasses_the_cache() {
    let (service, _repository, _cache) = service_with(10);
    service.create_task(&task_at("a", "pending", T0)).await.unwrap();
    service.create_task(&task_at("b", "done", T0 + 1)).await.unwrap();

    let filter = TaskFilter {
        status: Some("done".to_string()),
        priority: None,
    };
    let page = service.list_tasks(&filter, None, 1, 10).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "b");
}

#[tokio::test]
async fn sorted_listing_bypasses_the_cache() {
    let (service, _repository, _cache) = service_with(10);
    let mut low = task_at("low", "pending", T0);
    low.priority = 1;
    let mut high = task_at("high", "pending", T0 + 1);
    high.priority = 9;
    service.create_task(&low).await.unwrap();
    service.create_task(&high).await.unwrap();

    let sort = SortSpec {
        field: "priority".to_string(),
        order: SortOrder::Desc,
    };
    let page = service
        .list_tasks(&TaskFilter::default(), Some(&sort), 1, 10)
        .await
        .unwrap();
    let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["high", "low"]);
}

#[tokio::test]
async fn update_applies_changes_and_refreshes_cache() {
    let (service, repository, cache) = service_with(10);
    service.create_task(&task_at("a", "pending", T0)).await.unwrap();

    let updated = service
        .update_task(
            "a",
            TaskChanges {
                status: Some("done".to_string()),
                priority: Some(7),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, "done");
    assert_eq!(updated.priority, 7);
    assert_eq!(repository.get_by_id("a").await.unwrap(), updated);
    assert_eq!(cache.get_task("a").await.unwrap(), updated);
}

#[tokio::test]
async fn update_of_missing_task_is_not_found() {
    let (service, _repository, _cache) = service_with(10);
    let err = service
        .update_task("ghost", TaskChanges::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_clears_repository_and_cache() {
    let (service, repository, cache) = service_with(10);
    service.create_task(&task_at("a", "pending", T0)).await.unwrap();

    service.delete_task("a").await.unwrap();

    assert!(repository.get_by_id("a").await.is_err());
    assert!(cache.get_task("a").await.is_err());
}

#[tokio::test]
async fn delete_tolerates_a_task_the_cache_never_saw() {
    let (service, repository, _cache) = service_with(10);
    repository.seed(task_at("repo-only", "pending", T0));

    service.delete_task("repo-only").await.unwrap();
    assert!(repository.get_by_id("repo-only").await.is_err());
}

#[tokio::test]
async fn delete_of_missing_task_is_not_found() {
    let (service, _repository, _cache) = service_with(10);
    let err = service.delete_task("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}
