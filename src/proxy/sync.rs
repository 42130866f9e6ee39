//! Best-effort user sync performed before each relayed request.
//!
//! The sync runs as its own task. Its outcome never reaches the relayed
//! request: failures go to a channel that is only drained for logging.

use reqwest::Client;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::client::{ApiClient, TokenStore};
use crate::models::Session;

/// A user sync that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub email: String,
    pub error: String,
}

pub type SyncFailures = mpsc::UnboundedReceiver<SyncFailure>;

/// Dispatches `POST /auth/sync-user` calls for proxied sessions.
#[derive(Debug, Clone)]
pub struct UserSync {
    backend: ApiClient,
    failures: mpsc::UnboundedSender<SyncFailure>,
    allow_email_fallback: bool,
}

impl UserSync {
    /// Create the dispatcher and the receiving end of its failure channel.
    pub fn new(http: Client, backend_url: &str, allow_email_fallback: bool) -> (Self, SyncFailures) {
        let (failures, receiver) = mpsc::unbounded_channel();
        let sync = Self {
            backend: ApiClient::direct(http, backend_url, TokenStore::in_memory()),
            failures,
            allow_email_fallback,
        };
        (sync, receiver)
    }

    /// Spawn a sync for this session.
    ///
    /// The returned receiver resolves once the task is done, whatever the
    /// outcome. `None` means no sync was sent.
    pub fn dispatch(&self, session: &Session) -> Option<oneshot::Receiver<()>> {
        let Some(payload) = session.sync_request(self.allow_email_fallback) else {
            tracing::debug!(session_id = %session.id, "Skipping user sync: no Google subject");
            return None;
        };

        let (done, finished) = oneshot::channel();
        let backend = self.backend.clone();
        let failures = self.failures.clone();

        tokio::spawn(async move {
            if let Err(e) = backend.sync_user(&payload).await {
                // The receiver may be gone during shutdown.
                let _ = failures.send(SyncFailure {
                    email: payload.email.clone(),
                    error: e.to_string(),
                });
            }
            let _ = done.send(());
        });

        Some(finished)
    }
}

/// Drain the failure channel into the log.
pub fn spawn_failure_logger(mut failures: SyncFailures) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            tracing::warn!(email = %failure.email, error = %failure.error, "Failed to sync user");
        }
    })
}
