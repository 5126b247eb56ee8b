//! Route handlers for the IMD records API.

pub mod ask_ai;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod imd;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes. Everything except the health check
/// and login requires a bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        // Session
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/auth/change-password", put(auth::change_password))
        // IMD records
        .route("/imds", get(imd::index).post(imd::store))
        .route("/imds/export", get(imd::export))
        .route("/imds/:id", get(imd::show).put(imd::update).delete(imd::destroy))
        // Analytics
        .route("/dashboard", get(dashboard::index))
        // Ask AI
        .route("/ask-ai/question", post(ask_ai::question))
        .route("/ask-ai/execute-query", post(ask_ai::execute_query))
        .route("/ask-ai/samples", get(ask_ai::samples))
        .route("/ask-ai/schema", get(ask_ai::schema))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}
