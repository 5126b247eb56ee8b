//! HTTP API for the IMD (Inisiasi Menyusu Dini) records service.
//!
//! Bearer-token authenticated JSON API over record CRUD, dashboard
//! analytics, xlsx export, and the Ask-AI query gateway.

mod auth;
mod config;
mod error;
mod export;
mod routes;
mod state;

use ask_ai::WebhookClient;
use database::Database;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting IMD API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // First run: make sure there is a user to log in with.
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "12345678".to_string());
    if let Some(username) = routes::auth::seed_initial_user(&db, &admin_password).await? {
        info!(%username, "created initial admin user");
    }

    // AI webhook client
    let webhook = WebhookClient::new(&config.webhook_url)?;

    // Build application state and router
    let state = AppState::new(db, webhook);
    let app = routes::router(state);

    // Start server
    info!(addr = %config.addr, "IMD API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
