//! In-process stand-in for the Plume backend, bound to a loopback port.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post as post_route},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use plume_client::{ApiClient, ClientConfig, SessionEvents, SessionHandle, SessionStore};
use plume_store::Store;
use plume_types::api::{CreatePostRequest, LoginRequest, OAuthAppConfig, RegisterRequest};
use plume_types::models::{ConnectedAccount, Post, PostStatus, Tenant, User};

pub const SECRET: &str = "test-secret";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret1";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    tenant_id: String,
    exp: usize,
}

#[derive(Default)]
pub struct Recorded {
    /// `X-Tenant-ID` of every authenticated request, in order.
    pub tenant_headers: Vec<Option<String>>,
    pub register_calls: usize,
    pub created: Vec<CreatePostRequest>,
    /// Raw JSON bodies of `PUT /posts/{id}`, to check which fields were sent.
    pub updates: Vec<serde_json::Value>,
    pub posts: Vec<Post>,
    pub accounts: Vec<ConnectedAccount>,
    pub oauth: OAuthAppConfig,
}

pub type Shared = Arc<Mutex<Recorded>>;

pub struct Backend {
    pub url: String,
    pub recorded: Shared,
}

pub fn user() -> User {
    User {
        id: "u-1".into(),
        email: EMAIL.into(),
        name: Some("Ada".into()),
        tenant_id: "t-acme".into(),
    }
}

pub fn tenant() -> Tenant {
    Tenant {
        id: "t-acme".into(),
        name: "Acme".into(),
        subdomain: "acme".into(),
        domain: None,
        plan: Some("pro".into()),
        is_active: true,
    }
}

pub fn token() -> String {
    let claims = Claims {
        sub: user().id,
        tenant_id: tenant().id,
        exp: (chrono::Utc::now() + chrono::Duration::days(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .expect("encode token")
}

pub fn post(id: &str, status: PostStatus) -> Post {
    Post {
        id: id.into(),
        content: format!("post {}", id),
        networks: vec!["twitter".into()],
        media_urls: vec![],
        status,
        scheduled_at: None,
        published_at: None,
        error: None,
        created_at: chrono::Utc::now(),
    }
}

pub async fn spawn() -> Backend {
    let recorded: Shared = Arc::new(Mutex::new(Recorded {
        posts: vec![post("p-1", PostStatus::Scheduled), post("p-2", PostStatus::Published)],
        accounts: vec![ConnectedAccount {
            id: "acc-1".into(),
            network: "twitter".into(),
            username: "acme".into(),
            display_name: None,
            connected_at: None,
        }],
        ..Default::default()
    }));

    let app = Router::new()
        .route("/auth/login", post_route(login))
        .route("/auth/register", post_route(register))
        .route("/users/me", get(me))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/accounts/connected", get(connected))
        .route("/accounts/{id}/disconnect", delete(disconnect))
        .route("/oauth-apps/config", get(oauth_config).put(put_oauth_config))
        .route("/oauth-apps/authorization-urls", get(authorization_urls))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    Backend {
        url: format!("http://{}", addr),
        recorded,
    }
}

/// Fresh client wired to `url` with an in-memory store.
pub fn session_store(config: ClientConfig) -> SessionStore {
    let store = Arc::new(Store::open_in_memory().expect("store"));
    session_store_with(config, store)
}

pub fn session_store_with(config: ClientConfig, store: Arc<Store>) -> SessionStore {
    let client = ApiClient::new(config, SessionHandle::new(store), SessionEvents::new()).expect("client");
    SessionStore::new(client)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"}))).into_response()
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let tenant = headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.lock().unwrap().tenant_headers.push(tenant);

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    decode::<Claims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &Validation::default())
        .map(|_| ())
        .map_err(|_| unauthorized())
}

async fn login(Json(req): Json<LoginRequest>) -> Response {
    if req.email == EMAIL && req.password == PASSWORD {
        Json(json!({"token": token(), "user": user(), "tenant": tenant()})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid email or password"}))).into_response()
    }
}

async fn register(State(state): State<Shared>, Json(req): Json<RegisterRequest>) -> Response {
    state.lock().unwrap().register_calls += 1;
    if req.email == EMAIL {
        return (StatusCode::CONFLICT, Json(json!({"message": "Email already registered"}))).into_response();
    }
    let mut u = user();
    u.id = "u-2".into();
    u.email = req.email;
    u.name = Some(req.name);
    (StatusCode::CREATED, Json(json!({"token": token(), "user": u, "tenant": tenant()}))).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let mut u = user();
    u.name = Some("Ada Lovelace".into());
    Json(json!({"user": u, "tenant": tenant()})).into_response()
}

async fn list_posts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let posts = state.lock().unwrap().posts.clone();
    Json(json!({"posts": posts})).into_response()
}

async fn get_post(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let found = state.lock().unwrap().posts.iter().find(|p| p.id == id).cloned();
    match found {
        Some(p) => Json(p).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreatePostRequest>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if req.content.contains("reject me") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Network rejected the post"})),
        )
            .into_response();
    }
    if req.content.contains("list errors") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": 400,
                "message": ["content must not mention lists", "networks must be unique"],
                "error": "Bad Request"
            })),
        )
            .into_response();
    }
    if req.content.contains("explode") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let mut guard = state.lock().unwrap();
    let mut p = post(&format!("p-{}", guard.posts.len() + 1), PostStatus::Scheduled);
    p.content = req.content.clone();
    p.networks = req.networks.clone();
    guard.created.push(req);
    guard.posts.push(p.clone());
    (StatusCode::CREATED, Json(p)).into_response()
}

async fn update_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let mut guard = state.lock().unwrap();
    guard.updates.push(body.clone());
    let Some(p) = guard.posts.iter_mut().find(|p| p.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Post not found"}))).into_response();
    };
    if let Some(content) = body["content"].as_str() {
        p.content = content.to_string();
    }
    if let Some(networks) = body["networks"].as_array() {
        p.networks = networks.iter().filter_map(|n| n.as_str().map(String::from)).collect();
    }
    if let Some(at) = body["scheduledAt"].as_str() {
        p.scheduled_at = chrono::DateTime::parse_from_rfc3339(at).ok().map(|dt| dt.with_timezone(&chrono::Utc));
    }
    let updated = p.clone();
    (StatusCode::OK, Json(updated)).into_response()
}

async fn delete_post(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.lock().unwrap().posts.retain(|p| p.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn connected(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let accounts = state.lock().unwrap().accounts.clone();
    Json(accounts).into_response()
}

async fn disconnect(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.lock().unwrap().accounts.retain(|a| a.id != id);
    Json(json!({"success": true})).into_response()
}

async fn oauth_config(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let config = state.lock().unwrap().oauth.clone();
    Json(config).into_response()
}

async fn put_oauth_config(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(config): Json<OAuthAppConfig>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.lock().unwrap().oauth = config.clone();
    Json(config).into_response()
}

async fn authorization_urls(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({"urls": [{"network": "twitter", "url": "https://x.example/oauth?client_id=abc"}]}))
        .into_response()
}
