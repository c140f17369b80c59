//! Leaderboard Server Binary
//!
//! Starts the competition API, the score mutator and the WebSocket feed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin leaderboard-server
//! ```
//!
//! # Environment Variables
//!
//! - `LEADERBOARD_HTTP_HOST`: Bind address (default: 0.0.0.0)
//! - `LEADERBOARD_HTTP_PORT`: HTTP and WebSocket port (default: 4000)
//! - `LEADERBOARD_DATA_PATH`: Competition file (default: data/competitions.json)
//! - `LEADERBOARD_TICK_INTERVAL_MS`: Mutator interval (default: 2000)
//! - `LEADERBOARD_MAX_TOUCHED`: Draws per tick (default: 3)
//! - `LEADERBOARD_MAX_STEP_CENTS`: Largest step in hundredths (default: 500)
//! - `LEADERBOARD_BROADCAST_CAPACITY`: Per-viewer lag buffer (default: 1024)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: leaderboard-server)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use leaderboard_server::infrastructure::telemetry;
use leaderboard_server::{
    AppState, BroadcastConfig, BroadcastHub, CompetitionStore, HttpServer, JsonFileRepository,
    PrometheusStoreEvents, Schedule, ScoreMutator, ServerConfig, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let telemetry_guard = telemetry::init();

    tracing::info!(
        span_export = telemetry_guard.exporting(),
        "Starting Leaderboard Server"
    );

    let _metrics_handle = init_metrics();

    let config = ServerConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let repository = Arc::new(JsonFileRepository::new(config.data_path.clone()));
    let events = Arc::new(PrometheusStoreEvents);
    let store = Arc::new(
        CompetitionStore::load_or_seed(repository, Schedule::starting_now())
            .await?
            .with_events(events.clone()),
    );

    let hub = Arc::new(BroadcastHub::new(BroadcastConfig::from(config.broadcast)));

    let mutator = Arc::new(
        ScoreMutator::new(Arc::clone(&store), hub.clone(), config.mutator.into())
            .with_events(events),
    );
    let mutator_cancel = shutdown_token.clone();
    let mutator_task = tokio::spawn(async move { mutator.run(mutator_cancel).await });

    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    let server = HttpServer::new(config.http.bind_addr(), state, shutdown_token.clone());
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    tracing::info!("Leaderboard server ready");

    await_shutdown(shutdown_token).await;

    let _ = mutator_task.await;
    let _ = server_task.await;

    tracing::info!("Leaderboard server stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServerConfig) {
    tracing::info!(
        bind_addr = %config.http.bind_addr(),
        data_path = %config.data_path.display(),
        tick_interval_ms = config.mutator.tick_interval.as_millis(),
        max_touched = config.mutator.max_touched,
        max_step_cents = config.mutator.max_step_cents,
        broadcast_capacity = config.broadcast.capacity,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
