//! Leaderboard Watch
//!
//! Follows one competition's live leaderboard in the terminal.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin leaderboard-watch -- weekly-sprint
//! ```
//!
//! # Environment Variables
//!
//! - `LEADERBOARD_WS_URL`: Score feed (default: <ws://localhost:4000/ws>)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use leaderboard_client::{ClientConfig, ConnectionManager, LeaderboardReconciler, WsTransport};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TOP: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_logging();

    let competition_id = std::env::args()
        .nth(1)
        .context("usage: leaderboard-watch <competition-id>")?;
    let config = ClientConfig::from_env();

    tracing::info!(
        competition_id = %competition_id,
        ws_url = %config.ws_url,
        "Watching leaderboard"
    );

    let manager = ConnectionManager::new(Arc::new(WsTransport::new(config.ws_url)));
    let view = Arc::new(Mutex::new(LeaderboardReconciler::new(competition_id)));

    let _status = manager.subscribe_status(|status| {
        tracing::info!(%status, "Connection status changed");
    });

    let sink = Arc::clone(&view);
    let _messages = manager.subscribe_messages(move |message| {
        let mut view = sink.lock();
        if view.apply(message) {
            print_view(&view);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    tracing::info!("Received Ctrl+C, tearing down");
    manager.teardown();
    Ok(())
}

fn print_view(view: &LeaderboardReconciler) {
    println!("\n{} ({} traders)", view.competition_id(), view.view().len());
    for (position, trader) in view.top(TOP).iter().enumerate() {
        println!("{:>3}. {:<24} {:>10.2}", position + 1, trader.name, trader.score);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
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
