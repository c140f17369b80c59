//! Competition Store
//!
//! Owns every competition and its roster for the life of the process. Joins
//! and mutator ticks take the same write lock, so a read-modify-write on a
//! roster is never interleaved with another one.
//!
//! # Persistence
//!
//! A successful join that changed a roster writes the whole catalog to the
//! [`CompetitionRepository`]. The write happens after the roster lock is
//! released and its failure is logged, never returned: the in-memory roster
//! is authoritative and the join has already happened.
//!
//! Writes are serialized through an async mutex and the catalog is read only
//! once that mutex is held, so a slow writer can never overwrite newer state
//! with an older copy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leaderboard_protocol::{ScoreMessage, TraderScore};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::ports::{
    CompetitionRepository, NoOpStoreEvents, PersistenceError, StoreEventsPort,
};
use crate::domain::competition::{
    Competition, CompetitionDefinition, CompetitionStatus, DefinitionError, Schedule, StoreError,
    default_catalog,
};

// =============================================================================
// Views
// =============================================================================

/// One row of the competition listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionSummary {
    /// Competition ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Entry fee.
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_fee: Decimal,
    /// Prize pool.
    #[serde(with = "rust_decimal::serde::float")]
    pub prize_pool: Decimal,
    /// Roster size.
    pub participants: usize,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
    /// Status relative to the listing time.
    pub status: CompetitionStatus,
}

/// A ranked leaderboard for one competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardView {
    /// Competition ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Traders, highest score first.
    pub traders: Vec<TraderScore>,
}

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Roster size after the join.
    pub participants: usize,
    /// `false` if the username was already on the roster.
    pub joined: bool,
}

/// Failure to bring the store up at startup.
#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    /// Stored catalog could not be read.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Stored or built-in catalog is invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

// =============================================================================
// Competition Store
// =============================================================================

/// In-memory competition store backed by a durable mirror.
pub struct CompetitionStore {
    competitions: RwLock<Vec<Competition>>,
    repository: Arc<dyn CompetitionRepository>,
    events: Arc<dyn StoreEventsPort>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for CompetitionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitionStore")
            .field("competitions", &self.competitions.read().len())
            .finish_non_exhaustive()
    }
}

impl CompetitionStore {
    /// Build a store from definitions, laying windows out with `schedule`.
    ///
    /// Windows in the definitions are ignored; every process start gets a
    /// fresh schedule.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError` if the catalog is invalid.
    pub fn from_definitions(
        definitions: Vec<CompetitionDefinition>,
        schedule: Schedule,
        repository: Arc<dyn CompetitionRepository>,
    ) -> Result<Self, DefinitionError> {
        CompetitionDefinition::validate_all(&definitions)?;

        let competitions = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                let (start_at, end_at) = schedule.window(index);
                Competition::from_definition(definition, start_at, end_at)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            competitions: RwLock::new(competitions),
            repository,
            events: Arc::new(NoOpStoreEvents),
            persist_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Report failed roster writes to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn StoreEventsPort>) -> Self {
        self.events = events;
        self
    }

    /// Load the catalog from the repository, seeding it with the built-in
    /// catalog when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored catalog cannot be read or is invalid.
    /// A failure to write the seeded catalog is only logged.
    pub async fn load_or_seed(
        repository: Arc<dyn CompetitionRepository>,
        schedule: Schedule,
    ) -> Result<Self, StoreInitError> {
        let (definitions, seeded) = match repository.load().await? {
            Some(definitions) if !definitions.is_empty() => (definitions, false),
            _ => (default_catalog(), true),
        };

        let store = Self::from_definitions(definitions, schedule, repository)?;
        info!(
            competitions = store.competition_count(),
            seeded, "Competition store loaded"
        );

        if let Err(e) = store.persist().await {
            warn!(error = %e, "Failed to write competitions at startup");
        }

        Ok(store)
    }

    /// Number of competitions.
    #[must_use]
    pub fn competition_count(&self) -> usize {
        self.competitions.read().len()
    }

    /// Every competition with its participant count and status at `now`.
    #[must_use]
    pub fn list_competitions(&self, now: DateTime<Utc>) -> Vec<CompetitionSummary> {
        self.competitions
            .read()
            .iter()
            .map(|c| CompetitionSummary {
                id: c.id().to_string(),
                name: c.name().to_string(),
                entry_fee: c.entry_fee(),
                prize_pool: c.prize_pool(),
                participants: c.participants(),
                start_at: c.start_at(),
                end_at: c.end_at(),
                status: c.status_at(now),
            })
            .collect()
    }

    /// Add `username` to a competition's roster with a zero score.
    ///
    /// Joining again is a no-op that reports the current count. A roster
    /// change is followed by a full write to the repository, whose failure is
    /// logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - `StoreError::Validation` if either argument is blank
    /// - `StoreError::NotFound` if no competition has that ID
    pub async fn join(
        &self,
        competition_id: &str,
        username: &str,
    ) -> Result<JoinOutcome, StoreError> {
        if competition_id.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "competitionId",
            });
        }
        if username.trim().is_empty() {
            return Err(StoreError::Validation { field: "username" });
        }

        let outcome = {
            let mut competitions = self.competitions.write();
            let Some(competition) = competitions.iter_mut().find(|c| c.id() == competition_id)
            else {
                return Err(StoreError::not_found(competition_id));
            };
            let joined = competition.add_trader(username);
            JoinOutcome {
                participants: competition.participants(),
                joined,
            }
        };

        if outcome.joined {
            info!(
                competition_id,
                username,
                participants = outcome.participants,
                "Trader joined competition"
            );
            if let Err(e) = self.persist().await {
                self.events.persistence_failed();
                warn!(
                    competition_id,
                    username,
                    error = %e,
                    "Failed to persist competitions after join"
                );
            }
        } else {
            debug!(competition_id, username, "Trader already in competition");
        }

        Ok(outcome)
    }

    /// IDs of the competitions whose roster contains `username`.
    #[must_use]
    pub fn joined_competition_ids(&self, username: &str) -> Vec<String> {
        self.competitions
            .read()
            .iter()
            .filter(|c| c.has_trader(username))
            .map(|c| c.id().to_string())
            .collect()
    }

    /// Ranked leaderboard of one competition.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no competition has that ID.
    pub fn leaderboard(&self, competition_id: &str) -> Result<LeaderboardView, StoreError> {
        self.competitions
            .read()
            .iter()
            .find(|c| c.id() == competition_id)
            .map(|c| LeaderboardView {
                id: c.id().to_string(),
                name: c.name().to_string(),
                traders: c.leaderboard(),
            })
            .ok_or_else(|| StoreError::not_found(competition_id))
    }

    /// One snapshot message per competition.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ScoreMessage> {
        self.read(|competitions| competitions.iter().map(Competition::snapshot).collect())
    }

    /// Stored shape of every competition.
    #[must_use]
    pub fn definitions(&self) -> Vec<CompetitionDefinition> {
        self.read(|competitions| {
            competitions
                .iter()
                .map(Competition::to_definition)
                .collect()
        })
    }

    /// Run `f` under the read lock. No roster changes while `f` runs.
    pub fn read<R>(&self, f: impl FnOnce(&[Competition]) -> R) -> R {
        f(&self.competitions.read())
    }

    /// Run `f` under the write lock.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut [Competition]) -> R) -> R {
        f(&mut self.competitions.write())
    }

    /// Write the current catalog to the repository.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn persist(&self) -> Result<(), PersistenceError> {
        let _guard = self.persist_lock.lock().await;
        let definitions = self.definitions();
        self.repository.save(&definitions).await
    }
}

// =============================================================================
// Tests
// =============================================================================
