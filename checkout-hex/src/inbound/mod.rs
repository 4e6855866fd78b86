//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

pub mod auth;
mod handlers;
mod rate_limit;
mod server;

pub use handlers::{ApiError, AppState, BootstrapRequest, BootstrapResponse};
pub use rate_limit::RateLimiterState;
pub use server::HttpServer;
