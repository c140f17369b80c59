//! HTTP and WebSocket API
//!
//! # Endpoints
//!
//! - `GET /competitions` - competitions with participant counts and status
//! - `GET /competitions/{id}/leaderboard` - ranked roster
//! - `POST /join` - add a user to a roster
//! - `POST /my-competitions` - competitions a user has joined
//! - `GET /ws` - live snapshots and score updates
//! - `GET /health`, `GET /healthz`, `GET /metrics` - operations
//!
//! CORS is permissive so a browser front end on another origin can call the
//! API directly.

mod dto;
mod error;
mod handlers;
mod health;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

pub use dto::{
    CompetitionsResponse, JoinRequest, JoinResponse, MyCompetitionsRequest,
    MyCompetitionsResponse,
};
pub use error::ApiError;
pub use health::HealthResponse;

use crate::application::CompetitionStore;
use crate::infrastructure::broadcast::SharedBroadcastHub;

// =============================================================================
// Application State
// =============================================================================

/// Shared state for every handler.
#[derive(Debug)]
pub struct AppState {
    store: Arc<CompetitionStore>,
    hub: SharedBroadcastHub,
    version: String,
    started_at: Instant,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(store: Arc<CompetitionStore>, hub: SharedBroadcastHub, version: String) -> Self {
        Self {
            store,
            hub,
            version,
            started_at: Instant::now(),
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/competitions", get(handlers::list_competitions))
        .route("/competitions/{id}/leaderboard", get(handlers::leaderboard))
        .route("/join", post(handlers::join))
        .route("/my-competitions", post(handlers::my_competitions))
        .route("/ws", get(ws::upgrade))
        .route("/health", get(health::health))
        .route("/healthz", get(health::liveness))
        .route("/metrics", get(health::metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// =============================================================================
// HTTP Server
// =============================================================================

/// API server bound to a configured address.
#[derive(Debug)]
pub struct HttpServer {
    bind_addr: String,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(bind_addr: String, state: Arc<AppState>, cancel: CancellationToken) -> Self {
        Self {
            bind_addr,
            state,
            cancel,
        }
    }

    /// Bind and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the server fails while
    /// running.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| HttpServerError::BindFailed(self.bind_addr.clone(), e.to_string()))?;

        serve(listener, self.state, self.cancel).await
    }
}

/// Serve the API on an already bound listener until cancelled.
///
/// # Errors
///
/// Returns `HttpServerError::ServerFailed` if the server stops with an error.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    cancel: CancellationToken,
) -> Result<(), HttpServerError> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(addr = ?addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind the listener.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(String, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
