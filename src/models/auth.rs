//! Authentication payloads exchanged with the backend.

use serde::{Deserialize, Serialize};

use super::User;

/// Body of `POST /auth/google` and of the gateway's `POST /session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenRequest {
    pub token: String,
}

/// Token issued by the backend after a successful Google login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Body of `POST /auth/sync-user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub google_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncUserResponse {
    pub user: User,
}

/// Acknowledgement returned by deletes and logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}
