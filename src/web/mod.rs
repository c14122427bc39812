//! Web API module for FastNews.
//!
//! This module provides a small operator API next to the scheduled jobs:
//! a health check, a test notification trigger and read access to the
//! notification markers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
