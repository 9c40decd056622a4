//! # Structured Error Handling
//!
//! Error taxonomy for the task-record service. Each subsystem owns a
//! `thiserror` enum; [`TaskrecError`] aggregates them at the crate boundary.

use thiserror::Error;

/// Errors surfaced by the caching subsystem.
///
/// `Connection` is fatal at startup and retryable mid-operation. `NotFound`
/// is an expected signal the service layer uses to fall back to the
/// repository. `Serialization` means stored bytes no longer decode to a task
/// record and is surfaced as data corruption rather than silently dropped.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend unreachable: {message}")]
    Connection { message: String },

    #[error("task not cached: {id}")]
    NotFound { id: String },

    #[error("stored task record failed to decode: {message}")]
    Serialization { message: String },

    #[error("cache I/O error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    #[error("cache operation {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CacheError {
    pub fn serialization(err: &serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether a caller-side retry can reasonably be expected to succeed.
    ///
    /// The cache never retries internally; retry is the caller's decision.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Io { .. } | Self::Timeout { .. }
        )
    }
}

/// Errors surfaced by the source-of-truth repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("task not found: {id}")]
    NotFound { id: String },

    #[error("invalid sort field: {field}")]
    InvalidSort { field: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors surfaced by the service facade over repository + cache.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Repository(RepositoryError::NotFound { .. })
                | Self::Cache(CacheError::NotFound { .. })
        )
    }
}

/// Crate-level error aggregating all subsystem errors.
#[derive(Error, Debug)]
pub enum TaskrecError {
    #[error("configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigurationError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("messaging error: {0}")]
    Messaging(#[from] crate::messaging::MessagingError),
}

pub type Result<T> = std::result::Result<T, TaskrecError>;
