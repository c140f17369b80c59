//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the process
//! plumbing around them.

/// Broadcast channel adapter for score fan-out.
pub mod broadcast;

/// Configuration loaded from the environment.
pub mod config;

/// HTTP and WebSocket API.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Durable store adapters.
pub mod persistence;

/// OpenTelemetry tracing integration.
pub mod telemetry;
