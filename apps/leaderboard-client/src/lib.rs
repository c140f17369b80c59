#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines
    )
)]

//! Leaderboard Client - Shared Connection and Ranked Views
//!
//! Client side of the live leaderboard feed. A single [`ConnectionManager`]
//! owns the process-wide socket and fans decoded messages out to any number
//! of handlers; a [`LeaderboardReconciler`] per competition turns that
//! stream into a ranked roster.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::{Arc, Mutex};
//!
//! use leaderboard_client::{ConnectionManager, LeaderboardReconciler, WsTransport};
//!
//! # async fn example() {
//! let manager = ConnectionManager::new(Arc::new(WsTransport::new("ws://localhost:4000/ws")));
//! let view = Arc::new(Mutex::new(LeaderboardReconciler::new("weekly-sprint")));
//!
//! let sink = Arc::clone(&view);
//! let _subscription = manager.subscribe_messages(move |message| {
//!     if let Ok(mut view) = sink.lock() {
//!         view.apply(message);
//!     }
//! });
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Environment configuration.
pub mod config;

/// Shared connection and subscriber fan-out.
pub mod connection;

/// Transport errors.
pub mod error;

/// Ranked view per competition.
pub mod reconciler;

pub use config::ClientConfig;
pub use connection::{
    ConnectionManager, ConnectionStatus, FrameStream, MessageHandler, StatusHandler, Subscription,
    Transport, WsTransport,
};
pub use error::TransportError;
pub use reconciler::LeaderboardReconciler;
