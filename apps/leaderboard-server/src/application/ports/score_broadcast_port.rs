//! Score Broadcast Port (Driven Port)
//!
//! Fan-out of score messages to whoever is currently connected.

use leaderboard_protocol::ScoreMessage;

/// Port for publishing score messages to connected viewers.
///
/// Publishing never blocks and never fails: with nobody listening the
/// message is simply dropped.
pub trait ScoreBroadcastPort: Send + Sync {
    /// Publish a message. Returns how many receivers it was queued for.
    fn publish(&self, message: ScoreMessage) -> usize;
}
