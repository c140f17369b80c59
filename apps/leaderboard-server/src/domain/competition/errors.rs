//! Competition errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Errors surfaced to callers of the competition store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No competition with the given identifier.
    #[error("competition not found: {competition_id}")]
    NotFound {
        /// Requested competition ID.
        competition_id: String,
    },

    /// A required request field was missing or blank.
    #[error("{field} is required")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl StoreError {
    /// Not-found error for a competition ID.
    #[must_use]
    pub fn not_found(competition_id: impl Into<String>) -> Self {
        Self::NotFound {
            competition_id: competition_id.into(),
        }
    }
}

/// Errors in static or stored competition definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Competition ID was empty.
    #[error("competition id must not be empty")]
    EmptyId,

    /// Two definitions share an ID.
    #[error("duplicate competition id: {id}")]
    DuplicateId {
        /// Repeated ID.
        id: String,
    },

    /// Entry fee or prize pool below zero.
    #[error("competition {id}: {field} must be non-negative, got {value}")]
    NegativeAmount {
        /// Competition ID.
        id: String,
        /// `entryFee` or `prizePool`.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// End time not strictly after start time.
    #[error("competition {id}: end {end_at} is not after start {start_at}")]
    InvalidWindow {
        /// Competition ID.
        id: String,
        /// Window start.
        start_at: DateTime<Utc>,
        /// Window end.
        end_at: DateTime<Utc>,
    },
}
