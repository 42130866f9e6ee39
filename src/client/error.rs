//! Client error type.

use thiserror::Error;

/// Failure of a single façade call. Nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend (or gateway) answered with a non-success status.
    #[error("API Error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The request never produced a response.
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected schema.
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the persisted access token failed.
    #[error("Token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of an upstream failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
