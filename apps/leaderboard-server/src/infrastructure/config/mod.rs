//! Configuration Module
//!
//! Configuration loading for the leaderboard server.

mod settings;

pub use settings::{BroadcastSettings, ConfigError, HttpSettings, MutatorSettings, ServerConfig};
