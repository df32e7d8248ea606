//! # Matchgate HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /capabilities/catalog` - List the base capability set
//! - `POST /facts/normalize` - Normalize raw facts
//! - `POST /capabilities` - Derive the capability map
//! - `POST /capabilities/explain` - Derive with predicates and fired stages
//! - `POST /capabilities/check` - Check a gate (403 when denied)
//!
//! ## Security Configuration
//!
//! See [`crate::config`]: CORS origins, rate limit and API key come from the
//! config file and `MATCHGATE_*` environment variables.

mod guard;
mod handlers;
mod types;

pub use guard::{GlobalRateLimiter, Rejection, create_rate_limiter, keys_match};
pub use types::{
    CapabilitiesResponse, CatalogEntry, CatalogResponse, CheckRequest, CheckResponse,
    ErrorResponse, HealthResponse,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use matchgate_core::MatchgateError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Origins allowed when none are configured.
const LOCALHOST_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. Immutable once the server starts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    limiter: Option<GlobalRateLimiter>,
}

impl AppState {
    /// Create state from resolved configuration, building the limiter if the
    /// configuration asks for one.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            limiter: config.rate_quota().map(create_rate_limiter),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// CORS for the configured origins.
///
/// `["*"]` allows any origin. Otherwise the valid listed origins are allowed,
/// falling back to [`LOCALHOST_ORIGINS`] when none are configured or valid.
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    if matches!(origins, Some([wildcard]) if wildcard == "*") {
        tracing::warn!("CORS allows every origin; do not expose this server publicly");
        return CorsLayer::permissive();
    }

    let mut allowed: Vec<HeaderValue> = origins
        .unwrap_or_default()
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    if allowed.is_empty() {
        tracing::info!("CORS restricted to localhost");
        allowed = Vec::from(LOCALHOST_ORIGINS.map(HeaderValue::from_static));
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Requests pass trace, CORS, body limit, rate limit and API key in that
/// order before reaching a handler.
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    match config.rate_quota() {
        Some(quota) => tracing::info!(
            per_second = config.rate_limit,
            burst = quota.burst_size().get(),
            "Rate limiting enabled"
        ),
        None => tracing::info!("Rate limiting disabled"),
    }
    if config.api_key.is_none() {
        tracing::warn!("API key authentication disabled; set MATCHGATE_API_KEY to enable it");
    }

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/capabilities/catalog", get(handlers::catalog_handler))
        .route("/facts/normalize", post(handlers::normalize_handler))
        .route("/capabilities", post(handlers::derive_handler))
        .route("/capabilities/explain", post(handlers::explain_handler))
        .route("/capabilities/check", post(handlers::check_handler))
        .fallback(handlers::not_found_handler)
        .layer(from_fn_with_state(state.clone(), guard::api_key_middleware))
        .layer(from_fn_with_state(state.clone(), guard::rate_limit_middleware))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(build_cors_layer(config.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl+C.
pub async fn run_server(config: ServerConfig) -> Result<(), MatchgateError> {
    let addr = config.addr();
    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MatchgateError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Matchgate HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MatchgateError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
