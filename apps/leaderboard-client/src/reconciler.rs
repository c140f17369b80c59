//! Leaderboard Reconciler
//!
//! Folds the score feed for one competition into a ranked view. A snapshot
//! replaces the roster; a score update upserts by trader name. The view is
//! re-ranked after every message, so it never depends on arrival order
//! within a message.

use std::collections::HashMap;

use leaderboard_protocol::{ScoreMessage, TraderScore, rank, ranked};
use rust_decimal::Decimal;

/// Ranked view of one competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardReconciler {
    competition_id: String,
    view: Vec<TraderScore>,
}

impl LeaderboardReconciler {
    /// Empty view for `competition_id`.
    #[must_use]
    pub fn new(competition_id: impl Into<String>) -> Self {
        Self {
            competition_id: competition_id.into(),
            view: Vec::new(),
        }
    }

    /// Start from a roster fetched out of band, such as the HTTP leaderboard.
    #[must_use]
    pub fn with_roster(competition_id: impl Into<String>, roster: Vec<TraderScore>) -> Self {
        Self {
            competition_id: competition_id.into(),
            view: ranked(roster),
        }
    }

    /// Competition this view follows.
    #[must_use]
    pub fn competition_id(&self) -> &str {
        &self.competition_id
    }

    /// Current ranked roster.
    #[must_use]
    pub fn view(&self) -> &[TraderScore] {
        &self.view
    }

    /// Top `n` entries.
    #[must_use]
    pub fn top(&self, n: usize) -> &[TraderScore] {
        &self.view[..n.min(self.view.len())]
    }

    /// Apply one message. Returns `false` for another competition's traffic.
    pub fn apply(&mut self, message: &ScoreMessage) -> bool {
        if message.competition_id() != self.competition_id {
            return false;
        }

        if message.is_snapshot() {
            self.view = message.entries().to_vec();
            rank(&mut self.view);
        } else {
            self.upsert(message.entries());
        }
        true
    }

    fn upsert(&mut self, updates: &[TraderScore]) {
        let mut scores: HashMap<String, Decimal> = self
            .view
            .drain(..)
            .map(|trader| (trader.name, trader.score))
            .collect();
        for update in updates {
            scores.insert(update.name.clone(), update.score);
        }
        self.view = ranked(
            scores
                .into_iter()
                .map(|(name, score)| TraderScore::new(name, score)),
        );
    }
}
