//! Integration tests for the gateway.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::SESSION_COOKIE;
use crate::client::ApiClient;
use crate::config::Config;
use crate::db::{init_database, SessionStore};
use crate::models::{DeckCreate, FlashcardCreate, NewSession, Session};
use crate::proxy::{SyncFailures, UserSync};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    sessions: SessionStore,
    failures: SyncFailures,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new(backend_url: &str) -> Self {
        Self::with_sync_url(backend_url, backend_url).await
    }

    /// Fixture whose user sync targets `sync_url` instead of the backend.
    async fn with_sync_url(backend_url: &str, sync_url: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("sessions.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let sessions = SessionStore::new(pool, Duration::hours(1));

        let config = Config {
            backend_url: backend_url.to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            db_path,
            token_path: temp_dir.path().join("access_token"),
            session_ttl: Duration::hours(1),
            sync_email_fallback: true,
            log_level: "warn".to_string(),
            log_json: false,
        };

        let upstream = Client::new();
        let (sync, failures) = UserSync::new(upstream.clone(), sync_url, true);

        let state = AppState {
            sessions: sessions.clone(),
            upstream,
            sync: Arc::new(sync),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestFixture {
            client: Client::new(),
            base_url,
            sessions,
            failures,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a session directly in the store and return its cookie header value.
    async fn login(&self, email: &str, access_token: Option<&str>) -> String {
        let session = self
            .sessions
            .create(NewSession {
                email: email.to_string(),
                name: "Ana".to_string(),
                picture: None,
                google_id: Some("1093".to_string()),
                access_token: access_token.map(str::to_string),
            })
            .await
            .unwrap();
        cookie(&session.id)
    }
}

fn cookie(session_id: &str) -> String {
    format!("{}={}", SESSION_COOKIE, session_id)
}

fn user_json(email: &str) -> Value {
    json!({
        "id": 1,
        "email": email,
        "name": "Ana",
        "is_active": true,
        "created_at": "2025-01-01T10:00:00"
    })
}

async fn mount_sync_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/sync-user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": user_json("ana@example.com")})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health_check() {
    let backend = MockServer::start().await;
    let fixture = TestFixture::new(&backend.uri()).await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_proxy_without_session_never_calls_backend() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;

    // No cookie at all
    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Unknown session id
    let resp = fixture
        .client
        .post(fixture.url("/api/backend/decks"))
        .header("cookie", cookie("not-a-session"))
        .json(&json!({"name": "Test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let now = Utc::now();
    fixture
        .sessions
        .insert(&Session {
            id: "expired".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            picture: None,
            google_id: None,
            access_token: None,
            created_at: now - Duration::hours(3),
            expires_at: now - Duration::hours(1),
        })
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks"))
        .header("cookie", cookie("expired"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_proxy_get_passes_status_and_body_through() {
    let backend = MockServer::start().await;
    mount_sync_ok(&backend).await;

    let raw = r#"[{"id":1,"name":"Spanish","owner_id":1,"is_active":true,"created_at":"2025-01-01T10:00:00","flashcards":[]}]"#;
    Mock::given(method("GET"))
        .and(path("/decks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/decks/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Deck not found"}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let session = fixture.login("ana@example.com", None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.text().await.unwrap(), raw);

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks/99"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), r#"{"detail":"Deck not found"}"#);
}

#[tokio::test]
async fn test_proxy_forwards_json_body_byte_for_byte() {
    let backend = MockServer::start().await;
    mount_sync_ok(&backend).await;
    Mock::given(method("POST"))
        .and(path("/decks"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"name":"Test"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let session = fixture.login("ana@example.com", None).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/backend/decks"))
        .header("cookie", &session)
        .header("content-type", "application/json")
        .body(r#"{"name":"Test"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_proxy_injects_identity_and_keeps_query() {
    let backend = MockServer::start().await;
    mount_sync_ok(&backend).await;
    Mock::given(method("GET"))
        .and(path("/decks"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let session = fixture.login("ana@example.com", Some("jwt-1")).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks?skip=0&limit=10"))
        .header("cookie", &session)
        .header("x-user-email", "mallory@example.com")
        .header("x-request-id", "req-7")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let requests = backend.received_requests().await.unwrap();
    let relayed = requests
        .iter()
        .find(|r| r.url.path() == "/decks")
        .expect("relayed request");
    let emails: Vec<&str> = relayed
        .headers
        .get_all("x-user-email")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["ana@example.com"]);
    assert_eq!(relayed.headers["x-request-id"], "req-7");
    assert!(relayed.headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_sync_user_precedes_relay() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/sync-user"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "name": "Ana",
            "google_id": "1093"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": user_json("ana@example.com")})),
        )
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/flashcards/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"Flashcard deleted successfully"}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let session = fixture.login("ana@example.com", None).await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/backend/flashcards/5"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let paths: Vec<String> = backend
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/auth/sync-user", "/flashcards/5"]);
}

#[tokio::test]
async fn test_sync_failure_does_not_block_request() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/decks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&backend)
        .await;

    // Nothing listens on port 1, so the sync fails with a connection error.
    let mut fixture = TestFixture::with_sync_url(&backend.uri(), "http://127.0.0.1:1").await;
    let session = fixture.login("ana@example.com", None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "[]");

    let failure = fixture.failures.recv().await.unwrap();
    assert_eq!(failure.email, "ana@example.com");
}

#[tokio::test]
async fn test_unreachable_backend_returns_server_error() {
    let fixture = TestFixture::new("http://127.0.0.1:1").await;
    let session = fixture.login("ana@example.com", None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/decks"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_unsupported_method_is_rejected() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("sessions.sqlite"))
        .await
        .unwrap();
    let sessions = SessionStore::new(pool, Duration::hours(1));
    let session = sessions
        .create(NewSession {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            picture: None,
            google_id: None,
            access_token: None,
        })
        .await
        .unwrap();
    let (sync, _failures) = UserSync::new(Client::new(), &backend.uri(), true);
    let config = Config {
        backend_url: backend.uri(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: temp_dir.path().join("sessions.sqlite"),
        token_path: temp_dir.path().join("access_token"),
        session_ttl: Duration::hours(1),
        sync_email_fallback: true,
        log_level: "warn".to_string(),
        log_json: false,
    };
    let app = create_router(AppState {
        sessions,
        upstream: Client::new(),
        sync: Arc::new(sync),
        config: Arc::new(config),
    });

    let resp = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/backend/decks/1")
                .header("cookie", cookie(&session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

fn google_id_token(sub: &str) -> String {
    let payload = json!({
        "iss": "accounts.google.com",
        "sub": sub,
        "email": "ana@example.com"
    });
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

fn session_cookie_from(resp: &reqwest::Response) -> Option<String> {
    let set_cookie = resp.headers().get("set-cookie")?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?;
    pair.starts_with(SESSION_COOKIE).then(|| pair.to_string())
}

#[tokio::test]
async fn test_session_login_proxy_logout() {
    let backend = MockServer::start().await;
    let id_token = google_id_token("1093");

    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .and(body_json(json!({"token": id_token})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-1",
            "token_type": "bearer",
            "user": user_json("ana@example.com")
        })))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/sync-user"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "name": "Ana",
            "google_id": "1093"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": user_json("ana@example.com")})),
        )
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer jwt-1"))
        .and(header("x-user-email", "ana@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("ana@example.com")))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out successfully"})),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;

    // Sign in
    let resp = fixture
        .client
        .post(fixture.url("/session"))
        .json(&json!({"token": id_token}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let session = session_cookie_from(&resp).expect("session cookie");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ana@example.com");

    // Inspect
    let resp = fixture
        .client
        .get(fixture.url("/session"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "ana@example.com");

    // Relay with the new session
    let resp = fixture
        .client
        .get(fixture.url("/api/backend/auth/me"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Sign out
    let resp = fixture
        .client
        .delete(fixture.url("/session"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    for path in ["/session", "/api/backend/auth/me"] {
        let resp = fixture
            .client
            .get(fixture.url(path))
            .header("cookie", &session)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401, "{} after logout", path);
    }
}

#[tokio::test]
async fn test_rejected_google_token_opens_no_session() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"detail":"Invalid Google token"}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;

    let resp = fixture
        .client
        .post(fixture.url("/session"))
        .json(&json!({"token": "forged"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert!(session_cookie_from(&resp).is_none());

    let resp = fixture
        .client
        .post(fixture.url("/session"))
        .json(&json!({"token": "  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_login_relays_backend_failure_status() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;

    let resp = fixture
        .client
        .post(fixture.url("/session"))
        .json(&json!({"token": google_id_token("1093")}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    assert!(session_cookie_from(&resp).is_none());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_logout_succeeds_when_backend_logout_fails() {
    let backend = MockServer::start().await;
    mount_sync_ok(&backend).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("ana@example.com")))
        .expect(0)
        .mount(&backend)
        .await;

    let fixture = TestFixture::new(&backend.uri()).await;
    let session = fixture.login("ana@example.com", Some("jwt-1")).await;

    let resp = fixture
        .client
        .delete(fixture.url("/session"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");

    let session_id = session.trim_start_matches(&format!("{}=", SESSION_COOKIE));
    assert!(fixture.sessions.find_active(session_id).await.unwrap().is_none());

    let resp = fixture
        .client
        .get(fixture.url("/api/backend/auth/me"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_logout_succeeds_when_backend_unreachable() {
    let fixture = TestFixture::new("http://127.0.0.1:1").await;
    let session = fixture.login("ana@example.com", Some("jwt-1")).await;

    let resp = fixture
        .client
        .delete(fixture.url("/session"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/session"))
        .header("cookie", &session)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

// ==================== END-TO-END AGAINST A FAKE BACKEND ====================

#[derive(Default)]
struct FakeBackend {
    next_id: i64,
    decks: Vec<Value>,
    cards: Vec<Value>,
}

type FakeDb = Arc<Mutex<FakeBackend>>;

fn require_identity(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    if headers.get("x-user-email").is_none() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        ));
    }
    Ok(())
}

async fn fake_sync_user(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"user": user_json(body["email"].as_str().unwrap_or_default())}))
}

async fn fake_list_decks(State(db): State<FakeDb>) -> Json<Value> {
    Json(Value::Array(db.lock().unwrap().decks.clone()))
}

async fn fake_create_deck(
    State(db): State<FakeDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_identity(&headers)?;
    let mut db = db.lock().unwrap();
    db.next_id += 1;
    let deck = json!({
        "id": db.next_id,
        "name": body["name"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "owner_id": 1,
        "is_active": true,
        "created_at": "2025-01-01T10:00:00",
        "flashcards": []
    });
    db.decks.push(deck.clone());
    Ok(Json(deck))
}

async fn fake_list_cards(State(db): State<FakeDb>, Path(deck_id): Path<i64>) -> Json<Value> {
    let db = db.lock().unwrap();
    let cards = db
        .cards
        .iter()
        .filter(|c| c["deck_id"] == deck_id)
        .cloned()
        .collect();
    Json(Value::Array(cards))
}

async fn fake_create_card(
    State(db): State<FakeDb>,
    Path(deck_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_identity(&headers)?;
    let mut db = db.lock().unwrap();
    if !db.decks.iter().any(|d| d["id"] == deck_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Deck not found"})),
        ));
    }
    db.next_id += 1;
    let card = json!({
        "id": db.next_id,
        "front": body["front"],
        "back": body["back"],
        "deck_id": deck_id,
        "is_active": true,
        "created_at": "2025-01-01T10:00:00"
    });
    db.cards.push(card.clone());
    Ok(Json(card))
}

async fn spawn_fake_backend() -> String {
    let app = Router::new()
        .route("/auth/sync-user", post(fake_sync_user))
        .route("/decks", get(fake_list_decks).post(fake_create_deck))
        .route(
            "/flashcards/deck/{deck_id}",
            get(fake_list_cards).post(fake_create_card),
        )
        .with_state(FakeDb::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_end_to_end_deck_and_flashcard_through_proxy() {
    let backend_url = spawn_fake_backend().await;
    let fixture = TestFixture::new(&backend_url).await;
    let session = fixture.login("ana@example.com", None).await;
    let session_id = session
        .strip_prefix(&format!("{}=", SESSION_COOKIE))
        .unwrap();

    let api = ApiClient::via_proxy(Client::new(), &fixture.base_url, session_id);

    let deck = api.create_deck(&DeckCreate::new("Spanish")).await.unwrap();
    assert!(deck.id > 0);
    assert_eq!(deck.name, "Spanish");

    let card = api
        .create_flashcard(deck.id, &FlashcardCreate::new("hola", "hello"))
        .await
        .unwrap();
    assert_eq!(card.deck_id, deck.id);

    let cards = api.list_deck_flashcards(deck.id).await.unwrap();
    assert_eq!(cards, vec![card]);

    let decks = api.list_decks().await.unwrap();
    assert_eq!(decks.len(), 1);

    // Backend errors surface with their status
    let err = api
        .create_flashcard(deck.id + 100, &FlashcardCreate::new("uno", "one"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_proxy_client_with_stale_session_gets_unauthorized() {
    let backend_url = spawn_fake_backend().await;
    let fixture = TestFixture::new(&backend_url).await;

    let api = ApiClient::via_proxy(Client::new(), &fixture.base_url, "stale");
    let err = api.list_decks().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
}
