//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Joins**: join requests by outcome, failed roster writes
//! - **Mutator**: ticks by outcome
//! - **Fan-out**: messages broadcast, deltas lost to lagging viewers,
//!   connected viewers
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP port. Recording before
//! [`init_metrics`] is a no-op.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::application::ports::{StoreEventsPort, TickOutcome};
use crate::application::services::JoinOutcome;
use crate::domain::competition::StoreError;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if another global recorder is already installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "leaderboard_joins_total",
        "Join requests by outcome"
    );
    describe_counter!(
        "leaderboard_persistence_failures_total",
        "Failed writes of the competition catalog"
    );
    describe_counter!(
        "leaderboard_mutator_ticks_total",
        "Score mutator ticks by outcome"
    );
    describe_counter!(
        "leaderboard_messages_broadcast_total",
        "Messages handed to the broadcast hub by type"
    );
    describe_counter!(
        "leaderboard_deltas_lagged_total",
        "Score updates dropped for viewers that fell behind"
    );
    describe_gauge!(
        "leaderboard_connected_viewers",
        "Number of open WebSocket viewers"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Join outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    /// Trader added to the roster.
    Joined,
    /// Trader was already on the roster.
    AlreadyJoined,
    /// Unknown competition.
    NotFound,
    /// Missing or blank field.
    Invalid,
}

impl JoinResult {
    /// Label for the result of `CompetitionStore::join`.
    #[must_use]
    pub fn of(result: &Result<JoinOutcome, StoreError>) -> Self {
        match result {
            Ok(JoinOutcome { joined: true, .. }) => Self::Joined,
            Ok(JoinOutcome { joined: false, .. }) => Self::AlreadyJoined,
            Err(StoreError::NotFound { .. }) => Self::NotFound,
            Err(StoreError::Validation { .. }) => Self::Invalid,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::AlreadyJoined => "already_joined",
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
        }
    }
}

const fn tick_label(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Published => "published",
        TickOutcome::Idle => "idle",
    }
}

/// Record a join request.
pub fn record_join(result: JoinResult) {
    counter!("leaderboard_joins_total", "outcome" => result.as_str()).increment(1);
}

/// Record a failed catalog write.
pub fn record_persistence_failure() {
    counter!("leaderboard_persistence_failures_total").increment(1);
}

/// Record a mutator tick.
pub fn record_tick(outcome: TickOutcome) {
    counter!("leaderboard_mutator_ticks_total", "outcome" => tick_label(outcome)).increment(1);
}

/// Record a message handed to the hub.
pub fn record_broadcast(message_type: &'static str) {
    counter!("leaderboard_messages_broadcast_total", "message_type" => message_type).increment(1);
}

/// Record deltas a lagging viewer never received.
pub fn record_lagged_deltas(count: u64) {
    counter!("leaderboard_deltas_lagged_total").increment(count);
}

/// Update the connected viewer count.
#[allow(clippy::cast_precision_loss)]
pub fn set_connected_viewers(count: usize) {
    gauge!("leaderboard_connected_viewers").set(count as f64);
}

// =============================================================================
// Store Events Adapter
// =============================================================================

/// Counts store and mutator events in the global recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusStoreEvents;

impl StoreEventsPort for PrometheusStoreEvents {
    fn persistence_failed(&self) {
        record_persistence_failure();
    }

    fn tick_completed(&self, outcome: TickOutcome) {
        record_tick(outcome);
    }
}

// =============================================================================
// Tests
// =============================================================================
