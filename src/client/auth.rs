//! Authentication and health operations.

use reqwest::Method;

use super::{ApiClient, Result};
use crate::models::{
    AuthResponse, GoogleTokenRequest, HealthStatus, SyncUserRequest, SyncUserResponse, User,
};

impl ApiClient {
    /// POST /auth/google - exchange a Google ID token and keep the issued access token.
    pub async fn authenticate_with_google(&self, google_token: &str) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .post(
                "/auth/google",
                &GoogleTokenRequest {
                    token: google_token.to_string(),
                },
            )
            .await?;

        self.tokens.set(response.access_token.clone()).await?;
        Ok(response)
    }

    /// POST /auth/sync-user
    pub async fn sync_user(&self, data: &SyncUserRequest) -> Result<SyncUserResponse> {
        self.post("/auth/sync-user", data).await
    }

    /// GET /auth/me
    pub async fn current_user(&self) -> Result<User> {
        self.get("/auth/me").await
    }

    /// POST /auth/logout
    ///
    /// The stored token is dropped whether or not the backend acknowledged.
    pub async fn logout(&self) -> Result<()> {
        let result = self.send::<()>(Method::POST, "/auth/logout", None).await;
        self.tokens.clear().await?;
        result.map(|_| ())
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }
}
