//! Geomemo Server
//!
//! HTTP API over the memory store. Stands in for the mobile UI layer:
//! auth, session, memory capture/listing, and the discovery feed.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geomemo::{
    config::Config,
    memory::{MemoryRecord, MemoryStore, NewMemory},
    Error,
};

/// Application state shared across handlers
struct AppState {
    store: MemoryStore,
}

type SharedState = Arc<RwLock<AppState>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::default();
    tracing::info!("Starting Geomemo Server on port {}", config.server_port);
    tracing::info!("Data directory: {:?}", config.data_dir);

    // Initialize the store
    let store = MemoryStore::new(config.clone())?;

    let state = Arc::new(RwLock::new(AppState { store }));

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health))
        // Auth and session
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/session", get(get_session))
        // Memories
        .route("/memories", get(list_memories).post(create_memory))
        // Discovery feed
        .route("/feed", get(get_feed))
        // Add CORS
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state);

    let port = config.server_port;
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

// === Handlers ===

async fn health() -> &'static str {
    "ok"
}

// --- Auth handlers ---

#[derive(Debug, Deserialize)]
struct AuthRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    id: i64,
    email: String,
}

async fn register(
    State(state): State<SharedState>,
    Json(req): Json<AuthRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), StatusCode> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let state = state.write().await;

    let id = state
        .store
        .credentials()
        .register(&req.email, &req.password)
        .map_err(|e| match e {
            Error::DuplicateEmail(_) => StatusCode::CONFLICT,
            _ => {
                tracing::error!("register failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    // Signing up logs the user in, like the app did
    state
        .store
        .session()
        .set_current_user(&req.email)
        .map_err(internal_error)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            email: req.email,
        }),
    ))
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    email: Option<String>,
}

async fn login(
    State(state): State<SharedState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let state = state.write().await;

    let ok = state
        .store
        .credentials()
        .authenticate(&req.email, &req.password)
        .map_err(internal_error)?;

    if !ok {
        return Err(StatusCode::UNAUTHORIZED);
    }

    state
        .store
        .session()
        .set_current_user(&req.email)
        .map_err(internal_error)?;

    Ok(Json(SessionResponse {
        email: Some(req.email),
    }))
}

async fn get_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let state = state.read().await;

    let email = state
        .store
        .session()
        .current_user()
        .map_err(internal_error)?;

    Ok(Json(SessionResponse { email }))
}

// --- Memory handlers ---

#[derive(Debug, Deserialize)]
struct CreateMemoryRequest {
    /// Base64-encoded image bytes
    image: String,
    latitude: f64,
    longitude: f64,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateMemoryResponse {
    id: i64,
}

async fn create_memory(
    State(state): State<SharedState>,
    Json(req): Json<CreateMemoryRequest>,
) -> Result<(StatusCode, Json<CreateMemoryResponse>), StatusCode> {
    let image = BASE64
        .decode(&req.image)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    if image.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let state = state.write().await;

    let mut new = NewMemory::new(image, req.latitude, req.longitude);
    if let Some(message) = req.message {
        new = new.with_message(message);
    }

    let session = state.store.session().load().map_err(internal_error)?;
    let id = state
        .store
        .save_memory(new, &session)
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(CreateMemoryResponse { id })))
}

/// Listing response, image bytes elided
#[derive(Debug, Serialize)]
struct MemorySummary {
    id: i64,
    latitude: f64,
    longitude: f64,
    message: Option<String>,
    owner_email: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&MemoryRecord> for MemorySummary {
    fn from(record: &MemoryRecord) -> Self {
        Self {
            id: record.id,
            latitude: record.latitude,
            longitude: record.longitude,
            message: record.message.clone(),
            owner_email: record.owner_email.clone(),
            created_at: record.created_at,
        }
    }
}

async fn list_memories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MemorySummary>>, StatusCode> {
    let state = state.read().await;

    let memories = state.store.list_memories().map_err(internal_error)?;

    Ok(Json(memories.iter().map(MemorySummary::from).collect()))
}

// --- Feed handler ---

#[derive(Debug, Deserialize)]
struct FeedQuery {
    count: Option<usize>,
}

/// Feed item, image included for display
#[derive(Debug, Serialize)]
struct FeedItem {
    id: i64,
    image: String,
    latitude: f64,
    longitude: f64,
    message: Option<String>,
    owner_email: Option<String>,
}

impl From<MemoryRecord> for FeedItem {
    fn from(record: MemoryRecord) -> Self {
        Self {
            id: record.id,
            image: BASE64.encode(&record.image),
            latitude: record.latitude,
            longitude: record.longitude,
            message: record.message,
            owner_email: record.owner_email,
        }
    }
}

async fn get_feed(
    State(state): State<SharedState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<FeedItem>>, StatusCode> {
    let state = state.read().await;

    let count = query.count.unwrap_or(state.store.config().feed_size);

    let session = state.store.session().load().map_err(internal_error)?;
    let feed = state
        .store
        .discover_feed(&session, count, &mut rand::thread_rng())
        .map_err(internal_error)?;

    Ok(Json(feed.into_iter().map(FeedItem::from).collect()))
}

fn internal_error(e: Error) -> StatusCode {
    tracing::error!("store error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
