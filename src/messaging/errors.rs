//! Messaging error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("message queue is closed")]
    Closed,

    #[error("unknown topic: {topic}")]
    UnknownTopic { topic: String },

    #[error("failed to decode {topic} payload: {message}")]
    Payload { topic: String, message: String },
}
