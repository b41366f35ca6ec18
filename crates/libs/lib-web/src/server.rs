//! # Server Setup
//!
//! HTTP server configuration, routing, and startup.
//!
//! Wires together the REST handlers, the WebSocket chat channel, the
//! middleware stack, and the shared application state.

use crate::chat::{chat_websocket, MessageRouter, PresenceRegistry};
use crate::handlers::{auth, history, users};
use crate::middleware::{log_requests, require_auth, stamp_req};
use axum::extract::FromRef;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use lib_core::config::{core_config, init_config};
use lib_core::model::store::create_pool;
use lib_core::{Config, DbPool};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Server deployment configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the listener to, e.g. `127.0.0.1:3000`
    pub bind_address: String,
    /// Origins allowed by CORS; empty means allow any origin
    pub allowed_origins: Vec<String>,
    /// Directory containing the sqlx migration files
    pub migrations_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origins: Vec::new(),
            migrations_path: "migrations".to_string(),
        }
    }
}

/// Shared application state.
///
/// Handlers extract the slice they need via `FromRef`, so adding state does
/// not ripple through every handler signature.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub presence: Arc<PresenceRegistry>,
    pub router: Arc<MessageRouter>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<PresenceRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.presence.clone()
    }
}

impl FromRef<AppState> for Arc<MessageRouter> {
    fn from_ref(state: &AppState) -> Self {
        state.router.clone()
    }
}

/// Start the chat server.
///
/// Initializes logging and configuration, opens the database (running
/// pending migrations), builds the router, and serves until the process
/// is terminated.
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    // Logging first so everything after it is visible
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lib_web=debug,lib_core=debug".into()),
        )
        .init();

    info!("[STARTUP] Loading configuration");
    init_config().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let config = core_config().clone();

    // For file-backed SQLite the parent directory must exist before connect
    if let Some(db_path) = config.database_url.strip_prefix("sqlite:") {
        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }
    }

    info!("[STARTUP] Connecting to database: {}", config.database_url);
    let pool = create_pool().await?;

    info!(
        "[STARTUP] Running migrations from: {}",
        server_config.migrations_path
    );
    let migrator = sqlx::migrate::Migrator::new(Path::new(&server_config.migrations_path)).await?;
    migrator.run(&pool).await?;

    let presence = Arc::new(PresenceRegistry::new());
    let message_router = Arc::new(MessageRouter::new(pool.clone(), presence.clone()));

    let state = AppState {
        db: pool,
        config,
        presence,
        router: message_router,
    };

    let app = create_router(state, &server_config);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_address).await?;
    info!("[STARTUP] Listening on {}", server_config.bind_address);
    log_server_info(&server_config.bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Build the application router.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    // Endpoints behind JWT auth
    let protected = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/profile", post(users::update_profile))
        .route("/api/messages/{target}", get(history::get_history))
        .route_layer(middleware::from_fn(require_auth));

    let cors = build_cors(&server_config.allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/ws/chat", get(chat_websocket))
        .merge(protected)
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn(stamp_req))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins.is_empty() {
        warn!("[STARTUP] CORS: allowing any origin");
        return cors.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("[STARTUP] CORS: skipping unparsable origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}

/// Log the available endpoints at startup.
fn log_server_info(bind_address: &str) {
    info!("[STARTUP] Endpoints:");
    info!("[STARTUP]   GET  http://{}/health", bind_address);
    info!("[STARTUP]   POST http://{}/api/auth/register", bind_address);
    info!("[STARTUP]   POST http://{}/api/auth/login", bind_address);
    info!("[STARTUP]   GET  http://{}/api/users", bind_address);
    info!("[STARTUP]   POST http://{}/api/profile", bind_address);
    info!(
        "[STARTUP]   GET  http://{}/api/messages/{{target}}",
        bind_address
    );
    info!("[STARTUP]   WS   ws://{}/api/ws/chat", bind_address);
}
