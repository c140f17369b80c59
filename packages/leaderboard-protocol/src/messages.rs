//! Leaderboard Messages
//!
//! Frames pushed by the broadcast hub. Every frame is scoped to a single
//! competition and tagged by `type`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Trader Score
// =============================================================================

/// A trader name paired with an absolute score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderScore {
    /// Trader name (the viewer's username).
    pub name: String,
    /// Absolute score with two-decimal precision, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub score: Decimal,
}

impl TraderScore {
    /// Create a new trader score.
    #[must_use]
    pub fn new(name: impl Into<String>, score: Decimal) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

// =============================================================================
// Score Message
// =============================================================================

/// A message pushed from the server to connected viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreMessage {
    /// Complete current roster of one competition, in no particular order.
    Snapshot {
        /// Competition the roster belongs to.
        #[serde(rename = "competitionId")]
        competition_id: String,
        /// Every trader in the roster.
        traders: Vec<TraderScore>,
    },
    /// New absolute scores for a subset of one competition's traders.
    ScoreUpdate {
        /// Competition the updates belong to.
        #[serde(rename = "competitionId")]
        competition_id: String,
        /// Updated traders with their new absolute scores.
        updates: Vec<TraderScore>,
    },
}

impl ScoreMessage {
    /// Build a snapshot message.
    #[must_use]
    pub fn snapshot(competition_id: impl Into<String>, traders: Vec<TraderScore>) -> Self {
        Self::Snapshot {
            competition_id: competition_id.into(),
            traders,
        }
    }

    /// Build a score update message.
    #[must_use]
    pub fn score_update(competition_id: impl Into<String>, updates: Vec<TraderScore>) -> Self {
        Self::ScoreUpdate {
            competition_id: competition_id.into(),
            updates,
        }
    }

    /// Competition this message is scoped to.
    #[must_use]
    pub fn competition_id(&self) -> &str {
        match self {
            Self::Snapshot { competition_id, .. } | Self::ScoreUpdate { competition_id, .. } => {
                competition_id
            }
        }
    }

    /// Wire name of the message type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::ScoreUpdate { .. } => "score_update",
        }
    }

    /// Whether this is a full snapshot.
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot { .. })
    }

    /// Trader entries carried by the message.
    #[must_use]
    pub fn entries(&self) -> &[TraderScore] {
        match self {
            Self::Snapshot { traders, .. } => traders,
            Self::ScoreUpdate { updates, .. } => updates,
        }
    }
}
