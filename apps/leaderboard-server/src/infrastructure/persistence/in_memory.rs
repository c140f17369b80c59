//! In-memory competition repository for tests and local development.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{CompetitionRepository, PersistenceError};
use crate::domain::competition::CompetitionDefinition;

/// Keeps the last saved catalog in memory. Can be told to fail writes.
#[derive(Debug, Default)]
pub struct InMemoryCompetitionRepository {
    stored: RwLock<Option<Vec<CompetitionDefinition>>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryCompetitionRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `competitions`.
    #[must_use]
    pub fn with_competitions(competitions: Vec<CompetitionDefinition>) -> Self {
        Self {
            stored: RwLock::new(Some(competitions)),
            ..Self::default()
        }
    }

    /// Make every following save fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved catalog.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<CompetitionDefinition>> {
        self.stored.read().clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompetitionRepository for InMemoryCompetitionRepository {
    async fn load(&self) -> Result<Option<Vec<CompetitionDefinition>>, PersistenceError> {
        Ok(self.snapshot())
    }

    async fn save(&self, competitions: &[CompetitionDefinition]) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::other(
                "writes disabled",
            )));
        }
        *self.stored.write() = Some(competitions.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn save_then_load() {
        let repo = InMemoryCompetitionRepository::new();
        assert!(repo.load().await.unwrap().is_none());

        let defs = vec![CompetitionDefinition::new("a", "A", dec!(1), dec!(2))];
        repo.save(&defs).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(defs));
        assert_eq!(repo.save_count(), 1);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let defs = vec![CompetitionDefinition::new("a", "A", dec!(1), dec!(2))];
        let repo = InMemoryCompetitionRepository::with_competitions(defs.clone());
        repo.fail_writes(true);

        assert!(repo.save(&[]).await.is_err());
        assert_eq!(repo.snapshot(), Some(defs));
        assert_eq!(repo.save_count(), 0);
    }
}
