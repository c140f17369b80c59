//! Competition Definitions
//!
//! The static, persisted shape of a competition. Definitions are what the
//! durable store reads and writes; the live [`super::Competition`] is built
//! from one plus a scheduled window.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use leaderboard_protocol::TraderScore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DefinitionError;

/// Stored competition record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDefinition {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Entry fee, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_fee: Decimal,
    /// Prize pool, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub prize_pool: Decimal,
    /// Last computed start time. Recomputed at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    /// Last computed end time. Recomputed at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    /// Roster in join order.
    #[serde(default)]
    pub traders: Vec<TraderScore>,
}

impl CompetitionDefinition {
    /// Definition with an empty roster and no window.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entry_fee: Decimal,
        prize_pool: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entry_fee,
            prize_pool,
            start_at: None,
            end_at: None,
            traders: Vec::new(),
        }
    }

    /// Check a single definition.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty ID or a negative fee or prize pool.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.id.trim().is_empty() {
            return Err(DefinitionError::EmptyId);
        }
        for (field, value) in [("entryFee", self.entry_fee), ("prizePool", self.prize_pool)] {
            if value < Decimal::ZERO {
                return Err(DefinitionError::NegativeAmount {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Check a whole catalog: every definition valid, IDs unique.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate_all(definitions: &[Self]) -> Result<(), DefinitionError> {
        let mut seen = HashSet::with_capacity(definitions.len());
        for definition in definitions {
            definition.validate()?;
            if !seen.insert(definition.id.as_str()) {
                return Err(DefinitionError::DuplicateId {
                    id: definition.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Built-in catalog used when the durable store holds nothing yet.
#[must_use]
pub fn default_catalog() -> Vec<CompetitionDefinition> {
    vec![
        CompetitionDefinition::new(
            "weekly-sprint",
            "Weekly Sprint",
            Decimal::new(10, 0),
            Decimal::new(1_000, 0),
        ),
        CompetitionDefinition::new(
            "crypto-clash",
            "Crypto Clash",
            Decimal::new(25, 0),
            Decimal::new(5_000, 0),
        ),
        CompetitionDefinition::new(
            "grand-masters",
            "Grand Masters",
            Decimal::new(100, 0),
            Decimal::new(25_000, 0),
        ),
    ]
}
