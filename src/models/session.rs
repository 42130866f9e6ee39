//! Gateway session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SyncUserRequest, User};

/// A browser session held by the gateway and referenced by cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    /// Google account subject, when the login token carried one
    pub google_id: Option<String>,
    /// Backend access token issued at login
    pub access_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Build the user-sync payload for this session.
    ///
    /// The backend keys users by `google_id`. Without a Google subject the
    /// email stands in for it, which conflates identity with uniqueness, so
    /// that path is opt-in and always logged. Returns `None` when no id can
    /// be sent.
    pub fn sync_request(&self, allow_email_fallback: bool) -> Option<SyncUserRequest> {
        let google_id = match &self.google_id {
            Some(sub) => sub.clone(),
            None if allow_email_fallback => {
                tracing::warn!(
                    session_id = %self.id,
                    "No Google subject on session; syncing user with email as google_id"
                );
                self.email.clone()
            }
            None => return None,
        };

        Some(SyncUserRequest {
            email: self.email.clone(),
            name: if self.name.trim().is_empty() {
                self.email.clone()
            } else {
                self.name.clone()
            },
            picture: self.picture.clone(),
            google_id,
        })
    }
}

/// Fields required to open a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub google_id: Option<String>,
    pub access_token: Option<String>,
}

impl NewSession {
    pub fn from_login(user: &User, access_token: String, google_id: Option<String>) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
            google_id,
            access_token: Some(access_token),
        }
    }
}

/// Identity view of a session returned to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            email: session.email.clone(),
            name: session.name.clone(),
            picture: session.picture.clone(),
            expires_at: session.expires_at,
        }
    }
}

/// Response body of `POST /session`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}
