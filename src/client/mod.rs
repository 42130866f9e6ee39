//! Typed client for the Flashcards backend.
//!
//! One method per backend operation. Every call issues exactly one request and
//! either returns the typed resource or a [`ClientError`]. Requests go either
//! through the gateway's proxy with a session cookie, or straight to the
//! backend with the stored bearer token.

mod auth;
mod decks;
mod error;
mod flashcards;
mod token;

pub use error::{ClientError, Result};
pub use token::TokenStore;

use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::SESSION_COOKIE;
use crate::config::Config;
use crate::proxy::PROXY_MOUNT;

/// Where requests are sent and how they are authenticated.
#[derive(Debug, Clone)]
pub enum Transport {
    /// Through the gateway proxy, authenticated by the session cookie.
    Proxy {
        gateway_url: String,
        session_cookie: String,
    },
    /// Straight to the backend, authenticated by the stored bearer token.
    Direct { backend_url: String },
}

/// Client façade over the backend REST contract.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    transport: Transport,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(http: Client, transport: Transport, tokens: TokenStore) -> Self {
        Self {
            http,
            transport,
            tokens,
        }
    }

    /// Client that talks to the backend directly.
    pub fn direct(http: Client, backend_url: &str, tokens: TokenStore) -> Self {
        Self::new(
            http,
            Transport::Direct {
                backend_url: backend_url.trim_end_matches('/').to_string(),
            },
            tokens,
        )
    }

    /// Direct client for the configured backend, with the token persisted at `token_path`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let tokens = TokenStore::load(&config.token_path).await?;
        Ok(Self::direct(Client::new(), &config.backend_url, tokens))
    }

    /// Client that goes through the gateway with an established session.
    pub fn via_proxy(http: Client, gateway_url: &str, session_cookie: &str) -> Self {
        Self::new(
            http,
            Transport::Proxy {
                gateway_url: gateway_url.trim_end_matches('/').to_string(),
                session_cookie: session_cookie.to_string(),
            },
            TokenStore::in_memory(),
        )
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, endpoint: &str) -> String {
        match &self.transport {
            Transport::Proxy { gateway_url, .. } => {
                format!("{}{}{}", gateway_url, PROXY_MOUNT, endpoint)
            }
            Transport::Direct { backend_url } => format!("{}{}", backend_url, endpoint),
        }
    }

    /// Send one request and return the raw body of a successful response.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<String> {
        let mut request = self
            .http
            .request(method.clone(), self.url(endpoint))
            .header(CONTENT_TYPE, "application/json");

        match &self.transport {
            Transport::Proxy { session_cookie, .. } => {
                request = request.header(COOKIE, format!("{}={}", SESSION_COOKIE, session_cookie));
            }
            Transport::Direct { .. } => {
                if let Some(token) = self.tokens.get().await {
                    request = request.bearer_auth(token);
                }
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, endpoint, "Sending backend request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%method, endpoint, status = status.as_u16(), "Backend request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send(method, endpoint, body).await?;
        decode(endpoint, &text)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::DELETE, endpoint, None).await
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Reject blank required text before anything is sent.
fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
