//! Competition Aggregate
//!
//! A competition owns an insertion-ordered roster of traders. Traders are
//! appended on join, never removed, and at most one trader exists per name.
//!
//! # Lifecycle
//!
//! ```text
//!   Upcoming ──(now >= start_at)──► Active ──(now >= end_at)──► Ended
//! ```
//!
//! Status is derived from the clock and never stored.

mod definition;
mod errors;
mod schedule;

use chrono::{DateTime, Utc};
use leaderboard_protocol::{ScoreMessage, TraderScore, ranked};
use rust_decimal::Decimal;
use serde::Serialize;

pub use definition::{CompetitionDefinition, default_catalog};
pub use errors::{DefinitionError, StoreError};
pub use schedule::Schedule;

// =============================================================================
// Trader
// =============================================================================

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trader {
    name: String,
    score: Decimal,
}

impl Trader {
    /// A freshly joined trader with a zero score.
    #[must_use]
    pub fn joined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: Decimal::ZERO,
        }
    }

    /// Trader name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> Decimal {
        self.score
    }

    pub(crate) const fn set_score(&mut self, score: Decimal) {
        self.score = score;
    }

    /// Wire representation.
    #[must_use]
    pub fn to_score(&self) -> TraderScore {
        TraderScore::new(self.name.clone(), self.score)
    }
}

// =============================================================================
// Competition Status
// =============================================================================

/// Where a competition sits relative to its time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    /// Not started yet.
    Upcoming,
    /// Between start and end.
    Active,
    /// Past its end time.
    Ended,
}

// =============================================================================
// Competition
// =============================================================================

/// A time-boxed competition with its roster.
#[derive(Debug, Clone)]
pub struct Competition {
    id: String,
    name: String,
    entry_fee: Decimal,
    prize_pool: Decimal,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    traders: Vec<Trader>,
}

impl Competition {
    /// Build a competition from its stored definition and a time window.
    ///
    /// Duplicate trader names in the definition collapse onto the first
    /// occurrence so the roster starts out unique.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError` if the definition is invalid or the window
    /// does not end strictly after it starts.
    pub fn from_definition(
        definition: CompetitionDefinition,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Self, DefinitionError> {
        definition.validate()?;

        if end_at <= start_at {
            return Err(DefinitionError::InvalidWindow {
                id: definition.id,
                start_at,
                end_at,
            });
        }

        let mut traders: Vec<Trader> = Vec::with_capacity(definition.traders.len());
        for entry in definition.traders {
            if traders.iter().any(|t| t.name == entry.name) {
                tracing::warn!(
                    competition_id = %definition.id,
                    trader = %entry.name,
                    "Dropping duplicate trader from stored roster"
                );
                continue;
            }
            traders.push(Trader {
                name: entry.name,
                score: entry.score.round_dp(2),
            });
        }

        Ok(Self {
            id: definition.id,
            name: definition.name,
            entry_fee: definition.entry_fee,
            prize_pool: definition.prize_pool,
            start_at,
            end_at,
            traders,
        })
    }

    /// Competition identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry fee.
    #[must_use]
    pub const fn entry_fee(&self) -> Decimal {
        self.entry_fee
    }

    /// Prize pool.
    #[must_use]
    pub const fn prize_pool(&self) -> Decimal {
        self.prize_pool
    }

    /// Start of the competition window.
    #[must_use]
    pub const fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    /// End of the competition window.
    #[must_use]
    pub const fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }

    /// Roster in join order.
    #[must_use]
    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    pub(crate) fn traders_mut(&mut self) -> &mut [Trader] {
        &mut self.traders
    }

    /// Number of traders in the roster.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.traders.len()
    }

    /// Whether a trader with this name is in the roster.
    #[must_use]
    pub fn has_trader(&self, name: &str) -> bool {
        self.traders.iter().any(|t| t.name == name)
    }

    /// Append a trader with a zero score unless one with that name exists.
    ///
    /// Returns `true` if the roster changed.
    pub fn add_trader(&mut self, name: &str) -> bool {
        if self.has_trader(name) {
            return false;
        }
        self.traders.push(Trader::joined(name));
        true
    }

    /// Status at the given instant.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> CompetitionStatus {
        if now < self.start_at {
            CompetitionStatus::Upcoming
        } else if now < self.end_at {
            CompetitionStatus::Active
        } else {
            CompetitionStatus::Ended
        }
    }

    /// Roster in rank order.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<TraderScore> {
        ranked(self.traders.iter().map(Trader::to_score))
    }

    /// Full-roster snapshot message.
    #[must_use]
    pub fn snapshot(&self) -> ScoreMessage {
        ScoreMessage::snapshot(self.id.clone(), self.leaderboard())
    }

    /// Stored shape, including the current window and roster.
    #[must_use]
    pub fn to_definition(&self) -> CompetitionDefinition {
        CompetitionDefinition {
            id: self.id.clone(),
            name: self.name.clone(),
            entry_fee: self.entry_fee,
            prize_pool: self.prize_pool,
            start_at: Some(self.start_at),
            end_at: Some(self.end_at),
            traders: self.traders.iter().map(Trader::to_score).collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;

    use super::*;

    fn definition(traders: &[(&str, Decimal)]) -> CompetitionDefinition {
        CompetitionDefinition {
            id: "alpha".to_string(),
            name: "Alpha".to_string(),
            entry_fee: dec!(10),
            prize_pool: dec!(1000),
            start_at: None,
            end_at: None,
            traders: traders
                .iter()
                .map(|(name, score)| TraderScore::new(*name, *score))
                .collect(),
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        (start, start + TimeDelta::days(1))
    }

    fn competition(traders: &[(&str, Decimal)]) -> Competition {
        let (start, end) = window();
        Competition::from_definition(definition(traders), start, end).unwrap()
    }

    #[test]
    fn add_trader_appends_in_join_order() {
        let mut comp = competition(&[("A", dec!(0)), ("B", dec!(0))]);

        assert!(comp.add_trader("C"));

        let names: Vec<&str> = comp.traders().iter().map(Trader::name).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(comp.participants(), 3);
        assert_eq!(comp.traders()[2].score(), Decimal::ZERO);
    }

    #[test]
    fn add_existing_trader_is_noop() {
        let mut comp = competition(&[("A", dec!(2.5))]);

        assert!(!comp.add_trader("A"));
        assert_eq!(comp.participants(), 1);
        assert_eq!(comp.traders()[0].score(), dec!(2.5));
    }

    #[test]
    fn duplicate_stored_traders_collapse_to_first() {
        let comp = competition(&[("A", dec!(1)), ("B", dec!(2)), ("A", dec!(9))]);

        assert_eq!(comp.participants(), 2);
        assert_eq!(comp.traders()[0].score(), dec!(1));
    }

    #[test]
    fn window_must_end_after_start() {
        let (start, _) = window();
        let err = Competition::from_definition(definition(&[]), start, start).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidWindow { .. }));
    }

    #[test]
    fn status_follows_window() {
        let comp = competition(&[]);
        let (start, end) = window();

        assert_eq!(
            comp.status_at(start - TimeDelta::seconds(1)),
            CompetitionStatus::Upcoming
        );
        assert_eq!(comp.status_at(start), CompetitionStatus::Active);
        assert_eq!(comp.status_at(end), CompetitionStatus::Ended);
    }

    #[test]
    fn leaderboard_is_ranked() {
        let comp = competition(&[("A", dec!(0)), ("B", dec!(4)), ("C", dec!(-2))]);
        let names: Vec<String> = comp.leaderboard().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn to_definition_carries_window_and_roster() {
        let comp = competition(&[("A", dec!(1.25))]);
        let def = comp.to_definition();
        let (start, end) = window();

        assert_eq!(def.start_at, Some(start));
        assert_eq!(def.end_at, Some(end));
        assert_eq!(def.traders, vec![TraderScore::new("A", dec!(1.25))]);
    }
}
