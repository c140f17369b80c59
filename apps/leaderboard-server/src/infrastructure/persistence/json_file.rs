//! JSON File Repository
//!
//! Stores the catalog as a pretty-printed document:
//!
//! ```json
//! { "competitions": [ { "id": "...", "name": "...", "entryFee": 10, ... } ] }
//! ```
//!
//! Saves go to a sibling temporary file that is then renamed over the
//! target, so readers only ever see a complete document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{CompetitionRepository, PersistenceError};
use crate::domain::competition::CompetitionDefinition;

#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    competitions: Vec<CompetitionDefinition>,
}

/// File-backed competition repository.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Repository writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CompetitionRepository for JsonFileRepository {
    async fn load(&self) -> Result<Option<Vec<CompetitionDefinition>>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored competitions");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let document: CatalogDocument = serde_json::from_slice(&bytes)?;
        Ok(Some(document.competitions))
    }

    async fn save(&self, competitions: &[CompetitionDefinition]) -> Result<(), PersistenceError> {
        let document = CatalogDocument {
            competitions: competitions.to_vec(),
        };
        let mut bytes = serde_json::to_vec_pretty(&document)?;
        bytes.push(b'\n');

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            competitions = competitions.len(),
            "Competitions written"
        );
        Ok(())
    }
}
