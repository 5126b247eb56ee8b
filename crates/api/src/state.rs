//! Application state shared across handlers.

use ask_ai::WebhookClient;
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// AI webhook client.
    pub webhook: WebhookClient,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, webhook: WebhookClient) -> Self {
        Self { db, webhook }
    }
}
