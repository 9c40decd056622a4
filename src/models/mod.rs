//! Data models owned by the source-of-truth repository.

pub mod task;

pub use task::{Task, TaskChanges};
