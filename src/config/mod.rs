//! Configuration module for the gateway.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{Duration, Utc};

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the Flashcards backend service
    pub backend_url: String,
    /// Address to bind the gateway to
    pub bind_addr: SocketAddr,
    /// Path to the SQLite session database
    pub db_path: PathBuf,
    /// File holding the persisted access token for direct-mode clients
    pub token_path: PathBuf,
    /// Session lifetime
    pub session_ttl: Duration,
    /// Send the email as `google_id` when a session has no Google subject
    pub sync_email_fallback: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from a variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let backend_url = var("FLASHCARDS_BACKEND_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = var("FLASHCARDS_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid FLASHCARDS_BIND_ADDR: {}", e)))?;

        let db_path = var("FLASHCARDS_DB_PATH")
            .unwrap_or_else(|| "./data/sessions.sqlite".to_string())
            .into();

        let token_path = var("FLASHCARDS_TOKEN_PATH")
            .unwrap_or_else(|| "./data/access_token".to_string())
            .into();

        let session_ttl = parse_ttl(var("FLASHCARDS_SESSION_TTL_HOURS").as_deref().unwrap_or("720"))?;

        let sync_email_fallback = parse_flag(&var, "FLASHCARDS_SYNC_EMAIL_FALLBACK", true)?;

        let log_level = var("FLASHCARDS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_json = parse_flag(&var, "FLASHCARDS_LOG_JSON", false)?;

        Ok(Self {
            backend_url,
            bind_addr,
            db_path,
            token_path,
            session_ttl,
            sync_email_fallback,
            log_level,
            log_json,
        })
    }
}

/// Session lifetime in hours. Must be positive and keep expiry timestamps representable.
fn parse_ttl(value: &str) -> Result<Duration, AppError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .and_then(Duration::try_hours)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| {
            AppError::Config(format!(
                "FLASHCARDS_SESSION_TTL_HOURS must be a positive number of hours within the supported date range: {}",
                value
            ))
        })
}

fn parse_flag(
    var: impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool, AppError> {
    match var(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(AppError::Config(format!("Invalid {}: {}", name, other))),
        },
    }
}
