//! In-process fake of the Backend API for pipeline tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use otasuke_client::{
    ApiClient, ClientConfig, MemoryCredentialStore, Navigator, TokenPair, TokenStore,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const USER_ID: &str = "7f1c0a52-3c1e-4a7e-9a55-3f6a2c1d9b10";
pub const COMPANY_ID: &str = "0b5e7f0a-62a4-4d3c-8e0e-1f9b2a7c4d21";
pub const PASSWORD: &str = "correct-horse";

/// One request seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct BackendState {
    access_token: Mutex<String>,
    refresh_token: Mutex<String>,
    refresh_calls: AtomicUsize,
    refresh_delay: Mutex<Duration>,
    refresh_failure: Mutex<Option<StatusCode>>,
    refresh_bodies: Mutex<Vec<String>>,
    seen: Mutex<Vec<Seen>>,
    role: Mutex<String>,
    has_company: AtomicBool,
}

/// Shared handle to the fake backend's state.
#[derive(Clone)]
pub struct Backend {
    state: Arc<BackendState>,
}

impl Backend {
    /// Backend accepting `access` and `refresh` as the current pair.
    pub fn new(access: &str, refresh: &str) -> Self {
        let state = BackendState::default();
        *state.access_token.lock() = access.to_string();
        *state.refresh_token.lock() = refresh.to_string();
        *state.role.lock() = "contractor".to_string();
        state.has_company.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn with_refresh_delay(self, delay: Duration) -> Self {
        *self.state.refresh_delay.lock() = delay;
        self
    }

    pub fn with_refresh_failure(self, status: StatusCode) -> Self {
        *self.state.refresh_failure.lock() = Some(status);
        self
    }

    pub fn with_role(self, role: &str) -> Self {
        *self.state.role.lock() = role.to_string();
        self
    }

    pub fn without_company(self) -> Self {
        self.state.has_company.store(false, Ordering::SeqCst);
        self
    }

    /// Invalidate the current access token without issuing a new one.
    pub fn expire_access(&self) {
        *self.state.access_token.lock() = "revoked".to_string();
    }

    pub fn access_token(&self) -> String {
        self.state.access_token.lock().clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented to `/auth/refresh`, in arrival order.
    pub fn refresh_bodies(&self) -> Vec<String> {
        self.state.refresh_bodies.lock().clone()
    }

    /// Requests seen on `path`, excluding the refresh endpoint.
    pub fn seen(&self, path: &str) -> Vec<Seen> {
        self.state
            .seen
            .lock()
            .iter()
            .filter(|s| s.path == path)
            .cloned()
            .collect()
    }

    fn record(&self, uri: &Uri, headers: &HeaderMap) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.state.seen.lock().push(Seen {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization,
        });
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.state.access_token.lock());
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn issue(&self, access: String, refresh: String) -> Value {
        *self.state.access_token.lock() = access.clone();
        *self.state.refresh_token.lock() = refresh.clone();
        json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
        })
    }

    fn user(&self) -> Value {
        json!({
            "id": USER_ID,
            "email": "owner@example.com",
            "role": self.state.role.lock().clone(),
            "is_active": true,
        })
    }

    /// Serve the backend under `/api` on an ephemeral port.
    pub async fn spawn(&self) -> String {
        let api = Router::new()
            .route("/auth/refresh", post(refresh))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/companies/me", get(my_company))
            .route("/projects", get(projects))
            .route("/ping", get(ping))
            .route("/echo", post(echo))
            .route("/always-401", get(always_unauthorized))
            .route("/boom", get(boom))
            .route("/open", get(open))
            .with_state(self.clone());
        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let n = backend.state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let presented = body["refresh_token"].as_str().unwrap_or_default().to_string();
    backend.state.refresh_bodies.lock().push(presented.clone());

    let delay = *backend.state.refresh_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Some(status) = *backend.state.refresh_failure.lock() {
        return (status, Json(json!({ "detail": "Invalid refresh token" }))).into_response();
    }
    if presented != *backend.state.refresh_token.lock() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid refresh token" })),
        )
            .into_response();
    }

    Json(backend.issue(format!("access-{n}"), format!("refresh-{n}"))).into_response()
}

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
            .into_response();
    }
    Json(backend.issue("access-login".into(), "refresh-login".into())).into_response()
}

async fn register(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    *backend.state.role.lock() = body["role"].as_str().unwrap_or("contractor").to_string();
    if body["role"] == "contractor" {
        backend.state.has_company.store(false, Ordering::SeqCst);
    }
    (StatusCode::CREATED, Json(backend.user())).into_response()
}

async fn me(State(backend): State<Backend>, uri: Uri, headers: HeaderMap) -> Response {
    backend.record(&uri, &headers);
    if !backend.is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(backend.user()).into_response()
}

async fn my_company(State(backend): State<Backend>, uri: Uri, headers: HeaderMap) -> Response {
    backend.record(&uri, &headers);
    if !backend.is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !backend.state.has_company.load(Ordering::SeqCst) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Company not found" })),
        )
            .into_response();
    }
    Json(json!({
        "id": COMPANY_ID,
        "user_id": USER_ID,
        "name": "山田工務店",
        "description": null,
        "address": "東京都新宿区",
        "phone": null,
        "website": null,
        "established_year": 1998,
        "employee_count": 12,
        "average_rating": 4.5,
        "created_at": "2024-04-01T09:00:00Z",
        "updated_at": "2024-04-01T09:00:00Z",
        "specialties": [],
    }))
    .into_response()
}

async fn projects(
    State(backend): State<Backend>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    backend.record(&uri, &headers);
    if !backend.is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "items": [], "total": 0, "page": 1, "per_page": 20, "pages": 0 }))
        .into_response()
}

async fn ping(State(backend): State<Backend>, uri: Uri, headers: HeaderMap) -> Response {
    backend.record(&uri, &headers);
    if !backend.is_authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Could not validate credentials" })),
        )
            .into_response();
    }
    Json(json!({ "ok": true })).into_response()
}

async fn echo(
    State(backend): State<Backend>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record(&uri, &headers);
    if !backend.is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(body).into_response()
}

async fn always_unauthorized(
    State(backend): State<Backend>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    backend.record(&uri, &headers);
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Not allowed" })),
    )
        .into_response()
}

async fn boom(State(backend): State<Backend>, uri: Uri, headers: HeaderMap) -> Response {
    backend.record(&uri, &headers);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "database unavailable" })),
    )
        .into_response()
}

async fn open(State(backend): State<Backend>, uri: Uri, headers: HeaderMap) -> Response {
    backend.record(&uri, &headers);
    Json(json!({ "ok": true })).into_response()
}

/// Navigator that records every redirect.
#[derive(Default, Clone)]
pub struct RecordingNavigator {
    redirects: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, location: &str) {
        self.redirects.lock().push(location.to_string());
    }
}

/// A client wired to a running fake backend.
pub struct Harness {
    pub backend: Backend,
    pub client: ApiClient,
    pub store: Arc<MemoryCredentialStore>,
    pub navigator: RecordingNavigator,
}

impl Harness {
    /// Start `backend` and build a client whose store holds `tokens`.
    pub async fn start(backend: Backend, tokens: Option<TokenPair>) -> Self {
        let base_url = backend.spawn().await;
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = RecordingNavigator::default();

        let client = ApiClient::builder(ClientConfig::new(&base_url).unwrap())
            .tokens(TokenStore::new(store.clone()))
            .navigator(Arc::new(navigator.clone()))
            .build()
            .unwrap();

        if let Some(pair) = tokens {
            client.tokens().set_tokens(&pair).unwrap();
        }

        Self {
            backend,
            client,
            store,
            navigator,
        }
    }

    pub fn stored_access(&self) -> Option<String> {
        self.client.tokens().access_token().unwrap()
    }

    pub fn stored_refresh(&self) -> Option<String> {
        self.client.tokens().refresh_token().unwrap()
    }
}
