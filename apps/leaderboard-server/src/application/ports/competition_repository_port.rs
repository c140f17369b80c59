//! Competition Repository Port (Driven Port)
//!
//! Durable mirror of the competition catalog and rosters. The in-memory store
//! is authoritative at runtime; the repository only has to survive restarts.
//! Each call succeeds or fails as a whole and never touches in-memory state.

use async_trait::async_trait;

use crate::domain::competition::CompetitionDefinition;

/// Errors from a durable store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the backing medium failed.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded.
    #[error("persistence serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for loading and saving the competition catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    /// Load every stored competition.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<CompetitionDefinition>>, PersistenceError>;

    /// Replace the stored catalog with `competitions`.
    async fn save(&self, competitions: &[CompetitionDefinition]) -> Result<(), PersistenceError>;
}
