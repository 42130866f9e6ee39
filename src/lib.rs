//! Flashcards gateway.
//!
//! A session-authenticated relay in front of the Flashcards backend, plus the
//! typed client and study-mode state used by its consumers.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod proxy;
pub mod study;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::SessionStore;
use proxy::UserSync;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// HTTP client for backend calls
    pub upstream: reqwest::Client,
    pub sync: Arc<UserSync>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the session store for the auth layer
    let sessions = state.sessions.clone();

    // Relayed routes
    let proxy_routes = Router::new()
        .route(
            "/{*path}",
            get(proxy::forward)
                .post(proxy::forward)
                .put(proxy::forward)
                .delete(proxy::forward),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::session_layer(sessions.clone(), req, next)
        }));

    // Session management
    let session_routes = Router::new().route(
        "/session",
        post(api::login)
            .get(api::current_session)
            .delete(api::logout),
    );

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(api::health_check));

    Router::new()
        .nest(proxy::PROXY_MOUNT, proxy_routes)
        .merge(session_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
