//! Application state for the HTTP server.

use crate::db::Database;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the persistent store; clones share one pool.
    pub db: Database,
}

impl AppState {
    /// Create a new application state around the given store handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
