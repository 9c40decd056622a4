//! Service facades over the repository and the cache.

pub mod task_service;

pub use task_service::TaskService;
