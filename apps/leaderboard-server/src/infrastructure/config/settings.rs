//! Server Configuration Settings
//!
//! Configuration types for the leaderboard server, loaded from environment
//! variables. Unset or unparsable values fall back to defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::application::MutatorConfig;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Bind address.
    pub host: String,
    /// HTTP and WebSocket port.
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

impl HttpSettings {
    /// `host:port` bind string.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Score mutator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutatorSettings {
    /// Time between ticks.
    pub tick_interval: Duration,
    /// Draws per tick.
    pub max_touched: usize,
    /// Largest step in hundredths of a point, at most
    /// [`MutatorConfig::MAX_STEP_CENTS`].
    pub max_step_cents: u32,
}

impl Default for MutatorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2_000),
            max_touched: 3,
            max_step_cents: MutatorConfig::MAX_STEP_CENTS,
        }
    }
}

impl From<MutatorSettings> for MutatorConfig {
    fn from(settings: MutatorSettings) -> Self {
        Self {
            interval: settings.tick_interval,
            max_touched: settings.max_touched,
            max_step_cents: settings.max_step_cents,
        }
    }
}

/// Broadcast hub settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSettings {
    /// Messages a viewer may fall behind before it starts losing deltas.
    pub capacity: usize,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self { capacity: 1_024 }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP listener.
    pub http: HttpSettings,
    /// Durable store file.
    pub data_path: PathBuf,
    /// Score mutator.
    pub mutator: MutatorSettings,
    /// Broadcast hub.
    pub broadcast: BroadcastSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            mutator: MutatorSettings::default(),
            broadcast: BroadcastSettings::default(),
        }
    }
}

const DEFAULT_DATA_PATH: &str = "data/competitions.json";

impl ServerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `LEADERBOARD_TICK_INTERVAL_MS` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let defaults = Self::default();

        let http = HttpSettings {
            host: env.non_blank("LEADERBOARD_HTTP_HOST").unwrap_or(defaults.http.host),
            port: env.nonzero("LEADERBOARD_HTTP_PORT", defaults.http.port),
        };

        let data_path = env
            .non_blank("LEADERBOARD_DATA_PATH")
            .map_or(defaults.data_path, PathBuf::from);

        let tick_ms = env.parsed(
            "LEADERBOARD_TICK_INTERVAL_MS",
            u64::try_from(defaults.mutator.tick_interval.as_millis()).unwrap_or(2_000),
        );
        if tick_ms == 0 {
            return Err(ConfigError::ZeroValue(
                "LEADERBOARD_TICK_INTERVAL_MS".to_string(),
            ));
        }

        let mutator = MutatorSettings {
            tick_interval: Duration::from_millis(tick_ms),
            max_touched: env.nonzero("LEADERBOARD_MAX_TOUCHED", defaults.mutator.max_touched),
            max_step_cents: env
                .nonzero("LEADERBOARD_MAX_STEP_CENTS", defaults.mutator.max_step_cents)
                .min(MutatorConfig::MAX_STEP_CENTS),
        };

        let broadcast = BroadcastSettings {
            capacity: env.nonzero(
                "LEADERBOARD_BROADCAST_CAPACITY",
                defaults.broadcast.capacity,
            ),
        };

        Ok(Self {
            http,
            data_path,
            mutator,
            broadcast,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting that must be positive was zero.
    #[error("environment variable {0} must be greater than zero")]
    ZeroValue(String),
}

/// Variable source. Unparsable values read as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn non_blank(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.non_blank(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Like [`Env::parsed`], treating zero like an unset value.
    fn nonzero<T>(&self, key: &str, default: T) -> T
    where
        T: std::str::FromStr + PartialEq + Default,
    {
        self.non_blank(key)
            .and_then(|v| v.trim().parse::<T>().ok())
            .filter(|v| *v != T::default())
            .unwrap_or(default)
    }
}
