//! Broadcast Channel Adapter
//!
//! Fans score messages out to every connected viewer through a tokio
//! broadcast channel.
//!
//! # Delivery
//!
//! Each viewer owns a receiver with a bounded lag buffer. Publishing never
//! waits on a viewer: a viewer that falls more than `capacity` messages
//! behind loses the oldest ones and is told how many it missed. A viewer that
//! connects after a message was published never sees it. Nothing is retried
//! or acknowledged.

use std::sync::Arc;

use leaderboard_protocol::ScoreMessage;
use tokio::sync::broadcast;

use crate::application::ports::ScoreBroadcastPort;
use crate::infrastructure::config::BroadcastSettings;
use crate::infrastructure::metrics;

/// Configuration for the broadcast channel.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    /// Per-viewer lag buffer.
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { capacity: 1_024 }
    }
}

impl From<BroadcastSettings> for BroadcastConfig {
    fn from(settings: BroadcastSettings) -> Self {
        Self {
            capacity: settings.capacity.max(1),
        }
    }
}

/// Central hub for score messages.
///
/// # Example
///
/// ```rust
/// use leaderboard_server::infrastructure::broadcast::{BroadcastConfig, BroadcastHub};
///
/// let hub = BroadcastHub::new(BroadcastConfig::default());
/// let _rx = hub.subscribe();
/// assert_eq!(hub.viewer_count(), 1);
/// ```
#[derive(Debug)]
pub struct BroadcastHub {
    scores_tx: broadcast::Sender<ScoreMessage>,
}

impl BroadcastHub {
    /// Create a new broadcast hub with the given configuration.
    #[must_use]
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            scores_tx: broadcast::channel(config.capacity.max(1)).0,
        }
    }

    /// Create a new broadcast hub with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(BroadcastConfig::default())
    }

    /// Send a message to every current receiver.
    ///
    /// Returns the number of receivers, or `None` if nobody is listening.
    #[must_use]
    pub fn send(&self, message: ScoreMessage) -> Option<usize> {
        let kind = message.kind();
        let receivers = self.scores_tx.send(message).ok();
        metrics::record_broadcast(kind);
        receivers
    }

    /// Get a receiver for messages published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreMessage> {
        self.scores_tx.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.scores_tx.receiver_count()
    }

    /// Statistics about the hub.
    #[must_use]
    pub fn stats(&self) -> BroadcastStats {
        BroadcastStats {
            viewers: self.viewer_count(),
            queued: self.scores_tx.len(),
        }
    }
}

impl ScoreBroadcastPort for BroadcastHub {
    fn publish(&self, message: ScoreMessage) -> usize {
        self.send(message).unwrap_or(0)
    }
}

/// Shared broadcast hub reference.
pub type SharedBroadcastHub = Arc<BroadcastHub>;

/// Statistics about the hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Live receivers.
    pub viewers: usize,
    /// Messages not yet seen by every receiver.
    pub queued: usize,
}

// =============================================================================
// Tests
// =============================================================================
