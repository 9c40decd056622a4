//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::messaging::InProcessQueue;
use crate::services::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TaskService>,
    /// Ingestion seam: producers embedding the router publish task records
    /// here; the consumer applies them through the same service operations
    /// the HTTP handlers use.
    pub queue: Arc<InProcessQueue>,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(
        service: Arc<TaskService>,
        queue: Arc<InProcessQueue>,
        server: ServerConfig,
    ) -> Self {
        Self {
            service,
            queue,
            server,
        }
    }
}
