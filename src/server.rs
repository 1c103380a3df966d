//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (CORS, logging, compression, timeouts)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, contacts, health, not_found};
use crate::state::ServerState;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Cross-origin policy from configuration: a configured origin list
/// restricts access to those origins; an empty list with CORS enabled is the
/// permissive variant; disabled emits no CORS headers at all.
fn build_cors(config: &ServerConfig) -> ServerResult<CorsLayer> {
    if !config.cors_allowed_origins.is_empty() {
        let origins = config
            .cors_allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ServerError::Config(format!("Invalid CORS origin: {err}")))?;
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE]))
    } else if config.enable_cors {
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
    } else {
        Ok(CorsLayer::new())
    }
}

/// Build the Axum router with all routes and middleware
///
/// Middleware stack (applied in reverse order):
/// 1. Request ID tracking
/// 2. Request logging
/// 3. Timeout handling
/// 4. Compression
/// 5. CORS
pub fn build_router(state: Arc<ServerState>) -> ServerResult<Router> {
    let cors = build_cors(&state.config)?;
    let timeout = state.config.timeout();

    Ok(Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route(
            "/api/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route("/api/contacts/search", get(contacts::search_contacts))
        .route(
            "/api/contacts/{id}",
            put(contacts::update_contact).delete(contacts::delete_contact),
        )
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the contactbook HTTP server
///
/// Connects to MongoDB, ensures the unique email index, builds the router,
/// and serves until SIGTERM or Ctrl+C. Returns `Ok(())` on clean shutdown,
/// or an error if configuration or the database connection fails.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.clone())
        .with_target(false)
        .json()
        .init();

    // Create server state (connects to the database)
    let state = Arc::new(ServerState::new(config.clone()).await?);

    // Build router
    let app = build_router(state)?;

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!("Starting contactbook server on {}", addr);
    tracing::info!(
        "Database: {}, Timeout: {}s",
        config.database,
        config.timeout_secs
    );
    if !config.cors_allowed_origins.is_empty() {
        tracing::info!("CORS restricted to {:?}", config.cors_allowed_origins);
    } else {
        tracing::info!("CORS: {}", if config.enable_cors { "open" } else { "off" });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
