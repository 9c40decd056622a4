//! # HTTP Surface
//!
//! Axum routes and handlers over the service facade. The web layer only
//! parses requests and maps errors; all behavior lives in
//! [`crate::services::TaskService`].

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
