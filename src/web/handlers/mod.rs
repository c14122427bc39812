//! API handlers for the web API.

pub mod markers;
pub mod notification;

pub use markers::*;
pub use notification::*;

use std::sync::Arc;

use crate::db::Database;
use crate::dispatch::Dispatcher;

/// Shared application state.
pub struct AppState {
    /// Marker store.
    pub db: Arc<Database>,
    /// Dispatcher used for the test notification.
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, dispatcher: Dispatcher) -> Self {
        Self { db, dispatcher }
    }
}
