//! End-to-end ingestion tests: a producer holding the queue handle drives
//! the same service operations as the HTTP surface, and the consumer
//! survives malformed input.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use taskrec::cache::{LruTaskCache, MemoryStore};
use taskrec::error::RepositoryError;
use taskrec::messaging::{
    InProcessQueue, MessageQueue, TaskConsumer, TASK_CREATE_TOPIC, TASK_DELETE_TOPIC,
    TASK_UPDATE_TOPIC,
};
use taskrec::models::Task;
use taskrec::repository::{SortSpec, TaskFilter, TaskRepository};
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

/// Map-backed repository; listing is unused on the ingestion path.
#[derive(Default)]
struct InMemoryRepository {
    tasks: Mutex<HashMap<String, Task>>,
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
        _filter: &TaskFilter,
        _sort: Option<&SortSpec>,
        _page: usize,
        _page_size: usize,
    ) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.tasks.lock().values().cloned().collect())
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

fn pipeline() -> (Arc<TaskService>, InProcessQueue, tokio::task::JoinHandle<()>) {
    let repository = Arc::new(InMemoryRepository::default());
    let cache = Arc::new(LruTaskCache::new(MemoryStore::new(), 10));
    let service = Arc::new(TaskService::new(repository, cache));
    let (queue, rx) = InProcessQueue::new(8);
    let consumer = TaskConsumer::spawn(service.clone(), rx);
    (service, queue, consumer)
}

#[tokio::test]
async fn queued_create_is_applied_through_the_service() {
    let (service, queue, consumer) = pipeline();
    let task = task_at("a", "pending", T0);

    queue
        .send(TASK_CREATE_TOPIC, serde_json::to_vec(&task).unwrap())
        .await
        .unwrap();
    queue.close();
    consumer.await.unwrap();

    assert_eq!(service.get_task("a").await.unwrap(), task);
}

#[tokio::test]
async fn queued_update_and_delete_follow_creates() {
    let (service, queue, consumer) = pipeline();
    let kept = task_at("kept", "pending", T0);
    let dropped = task_at("dropped", "pending", T0 + 1);

    for task in [&kept, &dropped] {
        queue
            .send(TASK_CREATE_TOPIC, serde_json::to_vec(task).unwrap())
            .await
            .unwrap();
    }
    let mut done = kept.clone();
    done.status = "done".to_string();
    queue
        .send(TASK_UPDATE_TOPIC, serde_json::to_vec(&done).unwrap())
        .await
        .unwrap();
    queue
        .send(TASK_DELETE_TOPIC, serde_json::to_vec(&dropped).unwrap())
        .await
        .unwrap();
    queue.close();
    consumer.await.unwrap();

    assert_eq!(service.get_task("kept").await.unwrap().status, "done");
    assert!(service.get_task("dropped").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn malformed_payload_does_not_stop_the_consumer() {
    let (service, queue, consumer) = pipeline();

    queue
        .send(TASK_CREATE_TOPIC, b"not a task record".to_vec())
        .await
        .unwrap();
    let task = task_at("after-garbage", "pending", T0);
    queue
        .send(TASK_CREATE_TOPIC, serde_json::to_vec(&task).unwrap())
        .await
        .unwrap();
    queue.close();
    consumer.await.unwrap();

    assert_eq!(service.get_task("after-garbage").await.unwrap(), task);
}
