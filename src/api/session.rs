//! Session endpoints: sign in with Google, inspect, sign out.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{google_subject, removal_cookie, resolve_session, session_cookie};
use crate::client::{ApiClient, ClientError, TokenStore};
use crate::errors::AppError;
use crate::models::{
    GoogleTokenRequest, LoginResponse, MessageResponse, NewSession, SessionInfo,
};
use crate::AppState;

/// POST /session - Exchange a Google ID token for a gateway session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<GoogleTokenRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    if request.token.trim().is_empty() {
        return Err(AppError::BadRequest("Token is required".to_string()));
    }

    let backend = ApiClient::direct(
        state.upstream.clone(),
        &state.config.backend_url,
        TokenStore::in_memory(),
    );
    let auth = backend
        .authenticate_with_google(&request.token)
        .await
        .map_err(login_error)?;

    // The backend has verified the token, so its claims can be read as-is.
    let google_id = google_subject(&request.token);
    let session = state
        .sessions
        .create(NewSession::from_login(&auth.user, auth.access_token, google_id))
        .await?;

    tracing::info!(email = %session.email, "User signed in");

    Ok((
        jar.add(session_cookie(session.id.clone())),
        Json(LoginResponse {
            user: auth.user,
            expires_at: session.expires_at,
        }),
    ))
}

/// GET /session - Identity of the current session.
pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionInfo>, AppError> {
    let session = resolve_session(&state.sessions, &jar)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(SessionInfo::from(&session)))
}

/// DELETE /session - End the current session.
///
/// Succeeds even without a session so the browser cookie is always cleared.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(session) = resolve_session(&state.sessions, &jar).await? {
        if let Some(token) = &session.access_token {
            let backend = ApiClient::direct(
                state.upstream.clone(),
                &state.config.backend_url,
                TokenStore::with_token(token.clone()),
            );
            if let Err(e) = backend.logout().await {
                tracing::warn!(email = %session.email, "Backend logout failed: {}", e);
            }
        }

        state.sessions.delete(&session.id).await?;
        tracing::info!(email = %session.email, "User signed out");
    }

    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

fn login_error(err: ClientError) -> AppError {
    match err {
        ClientError::Api { status: 401, body } => {
            tracing::info!("Google sign-in rejected by backend: {}", body);
            AppError::Unauthorized("Authentication failed".to_string())
        }
        ClientError::Api { status, body } => AppError::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            body,
        },
        ClientError::Transport(e) => AppError::from(e),
        other => {
            tracing::error!("Sign-in failed: {}", other);
            AppError::Internal(other.to_string())
        }
    }
}
