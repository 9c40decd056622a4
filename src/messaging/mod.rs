//! # Messaging
//!
//! Asynchronous ingestion pipeline: an external producer publishes task
//! records to per-operation topics, and a consumer applies them through the
//! same [`crate::services::TaskService`] operations the HTTP surface uses.
//!
//! The transport lives behind [`MessageQueue`]; [`in_process::InProcessQueue`]
//! is the bundled tokio-channel implementation, and a broker-backed
//! implementation slots behind the same trait.

pub mod errors;
pub mod in_process;

use async_trait::async_trait;

pub use errors::MessagingError;
pub use in_process::{InProcessQueue, TaskConsumer};

/// Topic carrying JSON task records to create.
pub const TASK_CREATE_TOPIC: &str = "task_create";
/// Topic carrying JSON task records to update.
pub const TASK_UPDATE_TOPIC: &str = "task_update";
/// Topic carrying JSON task records to delete (only the id is used).
pub const TASK_DELETE_TOPIC: &str = "task_delete";

/// One published message.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, topic: &str, payload: Vec<u8>) -> Result<(), MessagingError>;

    /// Stop accepting new messages. In-flight messages drain normally.
    fn close(&self);
}
