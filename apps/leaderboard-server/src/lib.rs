#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Leaderboard Server - Competition Rosters and Live Score Fan-out
//!
//! Holds a handful of time-boxed competitions, lets users join them, keeps
//! perturbing scores, and pushes every change to all connected viewers over
//! a single WebSocket each.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Competitions, traders, schedules and their errors
//!
//! - **Application**: Services and port definitions
//!   - `ports`: Durable store, score broadcast and store event interfaces
//!   - `services`: Competition store, score mutator
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `broadcast`: Channel-based score fan-out
//!   - `persistence`: JSON file and in-memory durable stores
//!   - `http`: REST endpoints and the WebSocket feed
//!   - `config`, `metrics`, `telemetry`
//!
//! # Data Flow
//!
//! ```text
//!  ScoreMutator ──► CompetitionStore ──► BroadcastHub ──► /ws viewer 1
//!                        ▲      │                     ──► /ws viewer 2
//!  POST /join ───────────┘      └──► JsonFileRepository
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Competition model with no I/O.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::competition::{
    Competition, CompetitionDefinition, CompetitionStatus, DefinitionError, Schedule, StoreError,
    Trader, default_catalog,
};

// Application services and ports
pub use application::{
    CompetitionRepository, CompetitionStore, CompetitionSummary, JoinOutcome, LeaderboardView,
    MutatorConfig, NoOpStoreEvents, PersistenceError, ScoreBroadcastPort, ScoreMutator,
    StoreEventsPort, StoreInitError, TickOutcome,
};

// Infrastructure config
pub use infrastructure::config::{
    BroadcastSettings, ConfigError, HttpSettings, MutatorSettings, ServerConfig,
};

// Broadcast hub
pub use infrastructure::broadcast::{
    BroadcastConfig, BroadcastHub, BroadcastStats, SharedBroadcastHub,
};

// Durable stores
pub use infrastructure::persistence::{InMemoryCompetitionRepository, JsonFileRepository};

// HTTP API
pub use infrastructure::http::{AppState, HttpServer, HttpServerError, router, serve};

// Metrics
pub use infrastructure::metrics::{PrometheusStoreEvents, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
