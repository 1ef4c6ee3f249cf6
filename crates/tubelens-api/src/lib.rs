//! Axum HTTP API server.
//!
//! This crate provides:
//! - Start and poll endpoints for playlist processing tasks
//! - Pass-through queries over processed video records
//! - Per-client rate limiting, CORS and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
