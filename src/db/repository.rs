//! Session repository.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{NewSession, Session};

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so they sort lexically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Persistent store for gateway sessions.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Open a new session that expires after the configured lifetime.
    pub async fn create(&self, new: NewSession) -> Result<Session, AppError> {
        let now = Utc::now().trunc_subsecs(6);
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Config("Session lifetime exceeds the supported date range".into()))?;
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            email: new.email,
            name: new.name,
            picture: new.picture,
            google_id: new.google_id,
            access_token: new.access_token,
            created_at: now,
            expires_at,
        };
        self.insert(&session).await?;

        tracing::debug!(session_id = %session.id, email = %session.email, "Session created");
        Ok(session)
    }

    /// Store a fully built session as-is.
    pub async fn insert(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sessions (id, email, name, picture, google_id, access_token, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&session.id)
        .bind(&session.email)
        .bind(&session.name)
        .bind(&session.picture)
        .bind(&session.google_id)
        .bind(&session.access_token)
        .bind(timestamp(session.created_at))
        .bind(timestamp(session.expires_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a live session. Expired sessions are deleted and reported as absent.
    pub async fn find_active(&self, id: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, name, picture, google_id, access_token, created_at, expires_at FROM sessions WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = row.as_ref().map(session_from_row).transpose()? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Session expired");
            self.delete(&session.id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete a session. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every expired session. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Purge expired sessions every `period` in the background.
    pub fn spawn_purger(&self, period: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!("Purged {} expired sessions", purged),
                    Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
                }
            }
        })
    }
}

fn session_from_row(row: &SqliteRow) -> Result<Session, AppError> {
    Ok(Session {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        picture: row.get("picture"),
        google_id: row.get("google_id"),
        access_token: row.get("access_token"),
        created_at: parse_timestamp(row.get("created_at"))?,
        expires_at: parse_timestamp(row.get("expires_at"))?,
    })
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid session timestamp {}: {}", value, e)))
}
