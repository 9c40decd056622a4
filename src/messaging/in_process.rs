//! # In-Process Queue
//!
//! Tokio-channel [`MessageQueue`] plus the consumer loop that dispatches
//! task messages to the service. The consumer never crashes on bad input:
//! malformed payloads and failed operations are logged and skipped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::models::{Task, TaskChanges};
use crate::services::TaskService;

use super::{
    MessageQueue, MessagingError, QueueMessage, TASK_CREATE_TOPIC, TASK_DELETE_TOPIC,
    TASK_UPDATE_TOPIC,
};

pub struct InProcessQueue {
    tx: Mutex<Option<mpsc::Sender<QueueMessage>>>,
}

impl InProcessQueue {
    /// Create a bounded queue; the receiver end feeds a [`TaskConsumer`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueueMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }
}

#[async_trait::async_trait]
impl MessageQueue for InProcessQueue {
    async fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), MessagingError> {
        let sender = self
            .tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or(MessagingError::Closed)?;
        sender
            .send(QueueMessage {
                topic: topic.to_string(),
                payload,
            })
            .await
            .map_err(|_| MessagingError::Closed)
    }

    fn close(&self) {
        *self.tx.lock() = None;
    }
}

/// Consumer loop applying queued task operations through the service.
pub struct TaskConsumer;

impl TaskConsumer {
    pub fn spawn(
        service: Arc<TaskService>,
        mut rx: mpsc::Receiver<QueueMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("task queue consumer started");
            while let Some(message) = rx.recv().await {
                if let Err(err) = Self::dispatch(&service, &message).await {
                    warn!(topic = %message.topic, error = %err, "dropped queue message");
                }
            }
            info!("task queue consumer stopped");
        })
    }

    async fn dispatch(
        service: &TaskService,
        message: &QueueMessage,
    ) -> Result<(), MessagingError> {
        let task = decode_task(&message.topic, &message.payload)?;

        let outcome = match message.topic.as_str() {
            TASK_CREATE_TOPIC => service.create_task(&task).await,
            TASK_UPDATE_TOPIC => {
                let changes = TaskChanges {
                    title: Some(task.title.clone()),
                    description: Some(task.description.clone()),
                    status: Some(task.status.clone()),
                    priority: Some(task.priority),
                };
                service.update_task(&task.id, changes).await.map(|_| ())
            }
            TASK_DELETE_TOPIC => service.delete_task(&task.id).await,
            other => {
                return Err(MessagingError::UnknownTopic {
                    topic: other.to_string(),
                })
            }
        };

        if let Err(err) = outcome {
            // The operation failed against the repository or cache; the
            // message is consumed either way.
            error!(topic = %message.topic, id = %task.id, error = %err, "queued task operation failed");
        }
        Ok(())
    }
}

fn decode_task(topic: &str, payload: &[u8]) -> Result<Task, MessagingError> {
    serde_json::from_slice(payload).map_err(|err| MessagingError::Payload {
        topic: topic.to_string(),
        message: err.to_string(),
    })
}
