//! Cookie session authentication.
//!
//! The browser holds only an opaque session id; identity lives in the session store.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::db::SessionStore;
use crate::errors::AppError;
use crate::models::Session;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "flashcards_session";

/// Session layer: resolves the cookie and makes the [`Session`] available to handlers.
///
/// Requests without a live session are answered here and never reach the backend.
pub async fn session_layer(sessions: SessionStore, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());

    match resolve_session(&sessions, &jar).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(None) => unauthorized_response(),
        Err(e) => e.into_response(),
    }
}

/// Look up the session named by the request's cookie.
pub async fn resolve_session(
    sessions: &SessionStore,
    jar: &CookieJar,
) -> Result<Option<Session>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let id = cookie.value();
    if id.is_empty() {
        return Ok(None);
    }
    sessions.find_active(id).await
}

/// Cookie carrying a freshly created session id.
pub fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that removes the session id from the browser.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Read the `sub` claim from a Google ID token's payload.
///
/// The signature is not checked here; call this only after the backend has
/// accepted the token.
pub fn google_subject(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims["sub"].as_str().map(str::to_string)
}

/// Create an unauthorized response.
pub fn unauthorized_response() -> Response {
    AppError::Unauthorized("Unauthorized".to_string()).into_response()
}
