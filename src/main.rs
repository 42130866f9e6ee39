//! Flashcards gateway binary.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flashcards_gateway::client::ApiClient;
use flashcards_gateway::config::Config;
use flashcards_gateway::db::{init_database, SessionStore};
use flashcards_gateway::proxy::{spawn_failure_logger, UserSync};
use flashcards_gateway::{create_router, AppState};

/// How often expired sessions are purged.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Flashcards gateway");
    tracing::info!("Backend URL: {}", config.backend_url);
    tracing::info!("Session database: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.sync_email_fallback {
        tracing::warn!(
            "User sync falls back to email as google_id (FLASHCARDS_SYNC_EMAIL_FALLBACK=true)"
        );
    }

    // Initialize session store
    let pool = init_database(&config.db_path).await?;
    let sessions = SessionStore::new(pool, config.session_ttl);
    sessions.spawn_purger(SESSION_PURGE_INTERVAL);

    // Probe the backend; an unreachable backend is not fatal
    let backend = ApiClient::from_config(&config).await?;
    match backend.health().await {
        Ok(health) => tracing::info!("Backend health: {} ({})", health.status, health.message),
        Err(e) => tracing::warn!("Backend health check failed: {}", e),
    }

    // Backend relay and user sync
    let upstream = reqwest::Client::new();
    let (sync, failures) =
        UserSync::new(upstream.clone(), &config.backend_url, config.sync_email_fallback);
    spawn_failure_logger(failures);

    // Create application state
    let state = AppState {
        sessions,
        upstream,
        sync: Arc::new(sync),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
