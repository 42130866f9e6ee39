//! Persisted access token for direct-mode requests.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::Result;

/// Holds the backend access token and mirrors it to disk when a path is set.
///
/// Cloning shares the same token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// An in-memory store already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            path: None,
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    /// Load the token persisted at `path`. A missing file means no token.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let token = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Some(contents.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), present = token.is_some(), "Loaded access token");

        Ok(Self {
            path: Some(path),
            token: Arc::new(RwLock::new(token)),
        })
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replace the token and persist it.
    pub async fn set(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        let mut guard = self.token.write().await;
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &token).await?;
        }
        *guard = Some(token);
        Ok(())
    }

    /// Forget the token and remove the persisted copy.
    pub async fn clear(&self) -> Result<()> {
        let mut guard = self.token.write().await;
        *guard = None;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
