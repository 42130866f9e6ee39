//! Session-authenticated relay to the backend.
//!
//! Every request under [`PROXY_MOUNT`] is forwarded to the same path on the
//! backend with the caller's identity attached. The backend's status and body
//! come back untouched.

mod sync;

pub use sync::*;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{
        header::{
            ACCEPT_ENCODING, AUTHORIZATION, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST,
            TRANSFER_ENCODING,
        },
        HeaderMap, HeaderName, HeaderValue, Method,
    },
    response::{IntoResponse, Response},
    Extension,
};

use crate::auth::SESSION_COOKIE;
use crate::errors::AppError;
use crate::models::Session;
use crate::AppState;

/// Path prefix under which browser requests are relayed.
pub const PROXY_MOUNT: &str = "/api/backend";

/// Identity header the backend trusts.
pub const USER_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-user-email");

/// Incoming headers that are replaced or must not cross the relay.
const STRIPPED_HEADERS: [HeaderName; 6] = [
    CONTENT_LENGTH,
    HOST,
    CONTENT_TYPE,
    CONNECTION,
    TRANSFER_ENCODING,
    // The body is relayed as raw bytes, so it must arrive unencoded.
    ACCEPT_ENCODING,
];

/// GET|POST|PUT|DELETE /api/backend/{*path} - relay to the backend.
pub async fn forward(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let url = upstream_url(&state.config.backend_url, &path, query.as_deref());
    let (content_type, body) = outbound_body(&method, &headers, body);

    if let Some(finished) = state.sync.dispatch(&session) {
        // Only completion matters here; failures are reported on the sync channel.
        let _ = finished.await;
    }

    let mut upstream_headers = forwarded_headers(&headers);
    upstream_headers.insert(CONTENT_TYPE, content_type);
    upstream_headers.insert(
        USER_EMAIL_HEADER,
        HeaderValue::from_str(&session.email)
            .map_err(|_| AppError::Internal(format!("Invalid session email: {}", session.email)))?,
    );
    if let Some(token) = &session.access_token {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            upstream_headers.insert(AUTHORIZATION, value);
        }
    }

    let mut request = state
        .upstream
        .request(method.clone(), &url)
        .headers(upstream_headers);
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!(%method, %url, "API proxy error: {}", e);
        AppError::Internal(format!("Backend transport error: {}", e))
    })?;

    let status = response.status();
    let data = response.bytes().await?;

    tracing::debug!(%method, %url, status = status.as_u16(), email = %session.email, "Relayed request");

    Ok((
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        data,
    )
        .into_response())
}

/// Backend URL for a relayed path, keeping the query string.
pub fn upstream_url(backend_url: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}",
        backend_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Content type and body to send upstream.
///
/// GET and DELETE never carry a body. JSON bodies go out byte-for-byte, or not
/// at all when blank; anything else is passed through unchanged.
pub fn outbound_body(method: &Method, headers: &HeaderMap, body: Bytes) -> (HeaderValue, Option<Bytes>) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    if *method == Method::GET || *method == Method::DELETE {
        return (content_type, None);
    }

    let is_json = content_type
        .to_str()
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    if is_json && body.iter().all(u8::is_ascii_whitespace) {
        return (content_type, None);
    }

    (content_type, Some(body))
}

/// Copy the caller's headers minus those the relay replaces.
///
/// The gateway's own session cookie never leaves the gateway; other cookies pass through.
pub fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in STRIPPED_HEADERS {
        forwarded.remove(name);
    }

    let cookies: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty() && !is_session_cookie(pair))
        .collect();
    forwarded.remove(COOKIE);
    if !cookies.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&cookies.join("; ")) {
            forwarded.insert(COOKIE, value);
        }
    }

    forwarded
}

fn is_session_cookie(pair: &str) -> bool {
    pair.split('=').next().map(str::trim) == Some(SESSION_COOKIE)
}
