//! Gateway endpoints that are served locally rather than relayed.

mod session;

pub use session::*;

/// Health check endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
